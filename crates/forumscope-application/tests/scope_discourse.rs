use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forumscope_application::{ExceptionScope, TopicRenderer};
use forumscope_core::search::{ResultList, SearchOptions};
use forumscope_core::ExceptionInfo;
use forumscope_infrastructure::{ClientSettings, DiscourseSearchClient, Settings};
use mockito::{Matcher, Server};
use serde_json::json;

#[derive(Debug, PartialEq)]
struct ZeroDivisionError;

impl fmt::Display for ZeroDivisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "division by zero")
    }
}

impl std::error::Error for ZeroDivisionError {}

#[derive(Default)]
struct CollectingRenderer {
    lists: Mutex<Vec<ResultList>>,
}

impl TopicRenderer for CollectingRenderer {
    fn render(&self, _exception: &ExceptionInfo, results: &ResultList) {
        self.lists.lock().unwrap().push(results.clone());
    }
}

fn client(base_url: String, timeout: Duration) -> Arc<DiscourseSearchClient> {
    let settings = ClientSettings {
        base_url,
        timeout,
        ..ClientSettings::default()
    };
    Arc::new(DiscourseSearchClient::new(&settings).expect("Should build client"))
}

#[tokio::test]
async fn test_failure_renders_top_liked_topics() {
    let mut server = Server::new_async().await;
    let topics: Vec<_> = [10, 5, 30, 1, 7]
        .iter()
        .enumerate()
        .map(|(i, likes)| {
            json!({
                "id": 100 + i,
                "title": format!("Division question {i}"),
                "slug": format!("division-question-{i}"),
                "like_count": likes,
                "views": 1000 - i,
            })
        })
        .collect();
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "ZeroDivisionError: division by zero order:likes".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"posts": [], "topics": topics}).to_string())
        .expect(1)
        .create_async()
        .await;

    let renderer = Arc::new(CollectingRenderer::default());
    let options = SearchOptions::default().top(3).sortby("likes");
    let scope = ExceptionScope::new(
        options,
        client(server.url(), Duration::from_secs(5)),
        renderer.clone(),
    )
    .expect("Options should be valid");

    let result: Result<f64, _> = scope.run(async { Err(ZeroDivisionError) }).await;

    assert_eq!(result, Err(ZeroDivisionError));
    mock.assert_async().await;

    let lists = renderer.lists.lock().unwrap();
    assert_eq!(lists.len(), 1);
    let likes: Vec<u64> = lists[0].iter().map(|t| t.like_count).collect();
    assert_eq!(likes, vec![30, 10, 7]);
    assert_eq!(
        lists[0].topics()[0].url,
        format!("{}/t/division-question-2/102", server.url())
    );
}

#[tokio::test]
async fn test_success_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let renderer = Arc::new(CollectingRenderer::default());
    let scope = ExceptionScope::new(
        SearchOptions::default(),
        client(server.url(), Duration::from_secs(5)),
        renderer.clone(),
    )
    .unwrap();

    let value = scope
        .run(async { Ok::<_, ZeroDivisionError>(vec![1, 2, 3]) })
        .await;

    assert_eq!(value, Ok(vec![1, 2, 3]));
    mock.assert_async().await;
    assert!(renderer.lists.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_timeout_still_reraises_original_failure() {
    // Accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let holder = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let renderer = Arc::new(CollectingRenderer::default());
    let scope = ExceptionScope::new(
        SearchOptions::default(),
        client(format!("http://{addr}"), Duration::from_millis(200)),
        renderer.clone(),
    )
    .unwrap();

    let result: Result<(), _> = scope.run(async { Err(ZeroDivisionError) }).await;
    holder.abort();

    assert_eq!(result, Err(ZeroDivisionError));
    let lists = renderer.lists.lock().unwrap();
    assert_eq!(lists.len(), 1);
    assert!(lists[0].is_empty());
    assert!(lists[0].is_unavailable());
}

#[tokio::test]
async fn test_scope_from_settings_rejects_invalid_search_section() {
    let settings = Settings {
        search: SearchOptions::default().sortby("newest"),
        ..Settings::default()
    };

    let result = ExceptionScope::from_settings(&settings, Arc::new(CollectingRenderer::default()));
    let err = result.err().expect("Invalid sortby should be rejected");
    assert!(err.is_config());
}

#[tokio::test]
async fn test_boxed_error_block_searches_with_inner_type_name() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search.json")
        .match_query(Matcher::UrlEncoded(
            "q".into(),
            "ParseIntError: invalid digit found in string".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"topics": [{"id": 7, "title": "Parsing numbers", "slug": "parsing-numbers"}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let renderer = Arc::new(CollectingRenderer::default());
    let scope = ExceptionScope::new(
        SearchOptions::default(),
        client(server.url(), Duration::from_secs(5)),
        renderer.clone(),
    )
    .unwrap();

    let result = scope
        .run(async {
            let n: u32 = "12x".parse()?;
            Ok::<u32, Box<dyn std::error::Error>>(n)
        })
        .await;

    assert_eq!(result.unwrap_err().to_string(), "invalid digit found in string");
    mock.assert_async().await;
    let lists = renderer.lists.lock().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].topics()[0].title, "Parsing numbers");
}
