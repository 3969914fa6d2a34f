//! Logging macros
//!
//! Every macro takes a message followed by optional `"key" => value` pairs;
//! values only need `Display`. `log_error!` and `log_warning!` also accept
//! `span = <Span>` right after the message.
//!
//! ```ignore
//! log_error!(codes::lexical::INVALID_CHARACTER, "invalid character",
//!     span = token.span(), "char" => ch);
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, ::std::string::ToString::to_string(&$value))),*]
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message),
            Some($span),
            $crate::__log_context!($($key => $value),*),
        )
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message),
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            Some($span),
            $crate::__log_context!($($key => $value),*),
        )
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::warning_with_code($code, $message),
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::success($code, $message),
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::info($message),
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

/// Context values are not formatted unless debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::emit(
                $crate::logging::LogEvent::debug($message),
                None,
                $crate::__log_context!($($key => $value),*),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn test_context_values_use_display() {
        let context: Vec<(&str, String)> =
            crate::__log_context!("offset" => 4usize, "text" => "09", "level" => codes::lexical::INVALID_CHARACTER);
        assert_eq!(
            context,
            vec![
                ("offset", "4".to_string()),
                ("text", "09".to_string()),
                ("level", "E020".to_string()),
            ]
        );
    }

    // Must expand and run with no global logger installed.
    #[test]
    fn test_macros_without_global_logger() {
        log_error!(codes::lexical::INVALID_CHARACTER, "invalid character '#'");
        log_error!(
            codes::lexical::MALFORMED_NUMERIC_LITERAL,
            "malformed numeric literal",
            span = Span::dummy(),
            "text" => "09",
            "offset" => 4,
        );
        log_warning!(codes::lexical::COMMENT_TOO_LONG, "comment too long", "length" => 10);
        log_warning!(codes::lexical::STRING_TOO_LARGE, "string too large", span = Span::dummy());
        log_success!(codes::success::TOKENIZATION_COMPLETE, "done", "tokens" => 3);
        log_info!("info", "count" => 1usize);
        log_debug!("debug", "kind" => "ID");
    }
}
