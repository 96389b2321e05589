//! Rendering of related topics for a captured failure.

use std::io::Write;
use std::sync::Mutex;

use forumscope_core::search::ResultList;
use forumscope_core::ExceptionInfo;

const NO_TOPICS_HINT: &str = "No topics found. Try setting criteria to 'broad'.";
const STUCK_HINT: &str =
    "Don't see a relevant topic? Try changing the criteria to `narrow` or tweaking the other parameters.";

/// Consumer of the ranked topic list.
///
/// Called exactly once per captured failure, including when the list is
/// empty or the search was unavailable.
pub trait TopicRenderer: Send + Sync {
    fn render(&self, exception: &ExceptionInfo, results: &ResultList);
}

/// Formats the Markdown report for a captured failure.
///
/// ```text
/// **ZeroDivisionError**: division by zero
///
/// Related forum topics:
///
/// - [Dividing by zero](https://discuss.streamlit.io/t/dividing-by-zero/17) [✅ Solved]
/// ```
///
/// followed by a fenced `Traceback:` block when the failure carries a
/// location or a source chain.
pub fn format_report(exception: &ExceptionInfo, results: &ResultList) -> String {
    let mut sections = Vec::new();

    sections.push(format!("**{}**: {}", exception.type_name(), exception.message()));

    let body = if let Some(reason) = results.unavailable_reason() {
        format!("Forum search unavailable: {}", reason)
    } else if results.is_empty() {
        NO_TOPICS_HINT.to_string()
    } else {
        let links: Vec<String> = results
            .iter()
            .map(|topic| {
                let mut line = format!("- [{}]({})", escape_link_text(&topic.title), topic.url);
                if topic.has_accepted_answer {
                    line.push_str(" [✅ Solved]");
                }
                line
            })
            .collect();
        links.join("\n")
    };
    sections.push(format!("Related forum topics:\n\n{}", body));

    let mut trace_lines = Vec::new();
    if let Some(location) = exception.location() {
        trace_lines.push(format!("at {}", location));
    }
    trace_lines.extend(
        exception
            .traceback()
            .iter()
            .map(|cause| format!("caused by: {}", cause)),
    );
    if !trace_lines.is_empty() {
        sections.push(format!("Traceback:\n\n```\n{}\n```", trace_lines.join("\n")));
    }

    if !results.is_empty() {
        sections.push(STUCK_HINT.to_string());
    }

    sections.join("\n\n")
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Writes [`format_report`] output to a writer.
pub struct MarkdownRenderer<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> MarkdownRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, e.g. to inspect a buffer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl MarkdownRenderer<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> TopicRenderer for MarkdownRenderer<W> {
    fn render(&self, exception: &ExceptionInfo, results: &ResultList) {
        let report = format_report(exception, results);
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(writer, "{}", report).and_then(|_| writer.flush()) {
            tracing::warn!(error = %err, "Failed to write forum topic report");
        }
    }
}

/// Emits the report as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl TopicRenderer for TracingRenderer {
    fn render(&self, exception: &ExceptionInfo, results: &ResultList) {
        tracing::error!(
            exception_type = exception.type_name(),
            message = exception.message(),
            location = exception.location().unwrap_or("unknown"),
            "Scoped block failed"
        );

        if let Some(reason) = results.unavailable_reason() {
            tracing::warn!(reason, "Related forum topics unavailable");
            return;
        }

        if results.is_empty() {
            tracing::info!("{}", NO_TOPICS_HINT);
        }

        for (rank, topic) in results.iter().enumerate() {
            tracing::info!(
                rank = rank + 1,
                id = topic.id,
                title = %topic.title,
                url = %topic.url,
                solved = topic.has_accepted_answer,
                "Related forum topic"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forumscope_core::search::{ResultRanker, SearchConfig, Topic};

    fn ranked(topics: Vec<Topic>) -> ResultList {
        ResultRanker::rank(topics, &SearchConfig::default())
    }

    #[test]
    fn test_report_lists_topics_and_solved_marker() {
        let exception = ExceptionInfo::new("ZeroDivisionError", "division by zero");
        let results = ranked(vec![
            Topic {
                has_accepted_answer: true,
                ..Topic::new(17, "Dividing by zero", "https://forum.test/t/dividing-by-zero/17")
            },
            Topic::new(18, "Odd [bracket] title", "https://forum.test/t/18"),
        ]);

        let report = format_report(&exception, &results);

        assert!(report.starts_with("**ZeroDivisionError**: division by zero\n\nRelated forum topics:\n\n"));
        assert!(report.contains(
            "- [Dividing by zero](https://forum.test/t/dividing-by-zero/17) [✅ Solved]\n"
        ));
        assert!(report.contains("- [Odd \\[bracket\\] title](https://forum.test/t/18)"));
        assert!(report.ends_with(STUCK_HINT));
        assert!(!report.contains("Traceback"));
    }

    #[test]
    fn test_report_for_empty_and_unavailable_lists() {
        let exception = ExceptionInfo::new("KeyError", "'x'");

        let report = format_report(&exception, &ResultList::empty());
        assert!(report.contains(NO_TOPICS_HINT));

        let report = format_report(&exception, &ResultList::unavailable("Network error: timed out"));
        assert!(report.contains("Forum search unavailable: Network error: timed out"));
        assert!(!report.contains(STUCK_HINT));
    }

    #[test]
    fn test_report_includes_traceback() {
        let exception = ExceptionInfo::new("LoadError", "failed to compute ratio")
            .with_traceback(vec!["division by zero".to_string()]);

        let report = format_report(&exception, &ResultList::empty());
        assert!(report.ends_with("Traceback:\n\n```\ncaused by: division by zero\n```"));
    }

    #[test]
    fn test_markdown_renderer_writes_report() {
        let renderer = MarkdownRenderer::new(Vec::new());
        let exception = ExceptionInfo::new("ValueError", "bad value");
        renderer.render(&exception, &ResultList::empty());

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(output, format!("{}\n", format_report(&exception, &ResultList::empty())));
    }
}
