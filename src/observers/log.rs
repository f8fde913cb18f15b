use std::borrow::Cow;
use std::fmt::Debug;

use crate::error::SequenceError;
use crate::observers::Observer;

/// Observer that prints every signal to stdout.
///
/// Enabled via the `logging` feature. Useful for demos and debugging.
pub struct LogObserver {
    name: Cow<'static, str>,
}

impl LogObserver {
    /// Creates an observer printing lines tagged with `name`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    fn next_line<T: Debug>(&self, value: &T) -> String {
        format!("[next] seq={} value={value:?}", self.name)
    }

    fn error_line(&self, error: &SequenceError) -> String {
        format!(
            "[error] seq={} label={} err={error}",
            self.name,
            error.as_label()
        )
    }

    fn complete_line(&self) -> String {
        format!("[complete] seq={}", self.name)
    }
}

impl<T: Debug + Send + 'static> Observer<T> for LogObserver {
    fn on_next(&mut self, value: T) {
        println!("{}", self.next_line(&value));
    }

    fn on_error(&mut self, error: SequenceError) {
        println!("{}", self.error_line(&error));
    }

    fn on_complete(&mut self) {
        println!("{}", self.complete_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let log = LogObserver::new("fruits");
        assert_eq!(log.next_line(&"Apple"), r#"[next] seq=fruits value="Apple""#);
        assert_eq!(
            log.error_line(&SequenceError::AlreadyConsumed),
            "[error] seq=fruits label=already_consumed err=sequence already consumed"
        );
        assert_eq!(log.complete_line(), "[complete] seq=fruits");
    }
}
