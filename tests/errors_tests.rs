use linkstat::errors::{LinkstatError, Result};
use linkstat::security::GateError;
use linkstat::services::ServiceError;
use linkstat::utils::url_validator::UrlValidationError;
use std::error::Error;
use std::time::Duration;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_codes_and_types() {
        let cases = [
            (LinkstatError::config("x"), "E001", "Configuration Error"),
            (LinkstatError::storage_backend("x"), "E002", "Storage Backend Error"),
            (LinkstatError::file_operation("x"), "E003", "File Operation Error"),
            (LinkstatError::serialization("x"), "E004", "Serialization Error"),
            (LinkstatError::validation("x"), "E005", "Validation Error"),
            (LinkstatError::not_found("x"), "E006", "Resource Not Found"),
            (LinkstatError::date_parse("x"), "E007", "Date Parse Error"),
        ];
        for (error, code, kind) in cases {
            assert_eq!(error.code(), code);
            assert_eq!(error.error_type(), kind);
            assert_eq!(error.message(), "x");
        }
    }

    #[test]
    fn test_display_is_simple_format() {
        let error = LinkstatError::file_operation("stats/abc.json: permission denied");
        assert_eq!(
            error.to_string(),
            "File Operation Error: stats/abc.json: permission denied"
        );
        assert_eq!(error.to_string(), error.format_simple());
    }

    #[test]
    fn test_colored_format_contains_parts() {
        colored::control::set_override(false);
        let error = LinkstatError::validation("bad code");
        let out = error.format_colored();
        assert!(out.contains("[ERROR]"));
        assert!(out.contains("E005"));
        assert!(out.contains("bad code"));
    }
}

#[cfg(test)]
mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let error: LinkstatError = io_error.into();
        assert!(matches!(error, LinkstatError::FileOperation(_)));
        assert!(error.to_string().contains("file missing"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json").unwrap_err();
        let error: LinkstatError = json_error.into();
        assert!(matches!(error, LinkstatError::Serialization(_)));
    }

    #[test]
    fn test_chrono_parse_error_conversion() {
        let parse_error = chrono::DateTime::parse_from_rfc3339("not a date").unwrap_err();
        let error: LinkstatError = parse_error.into();
        assert!(matches!(error, LinkstatError::DateParse(_)));
    }

    #[test]
    fn test_service_error_conversions() {
        let err: ServiceError = LinkstatError::not_found("abc").into();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(err.retry_after().is_none());

        let err: ServiceError = UrlValidationError::EmptyUrl.into();
        assert!(matches!(err, ServiceError::Validation(ref msg) if msg == "URL cannot be empty"));

        let err: ServiceError = GateError::TemporarilyUnavailable {
            retry_after: Duration::from_secs(42),
        }
        .into();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));
        assert!(err.to_string().contains("42s"));

        let err: ServiceError = GateError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "Invalid password");
    }
}

#[cfg(test)]
mod error_trait_tests {
    use super::*;

    #[test]
    fn test_error_trait_implementation() {
        let error = LinkstatError::validation("test");
        let error_trait: &dyn Error = &error;
        assert!(!error_trait.to_string().is_empty());
        assert!(error_trait.source().is_none());
    }

    #[test]
    fn test_send_sync_traits() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<LinkstatError>();
        assert_sync::<LinkstatError>();
        assert_send::<ServiceError>();
        assert_sync::<ServiceError>();
    }

    #[test]
    fn test_result_and_then() {
        let result: Result<i32> = Ok(10);
        let chained = result.and_then(|x| {
            if x > 5 {
                Ok(x * 2)
            } else {
                Err(LinkstatError::validation("too small"))
            }
        });
        assert_eq!(chained.unwrap(), 20);
    }
}
