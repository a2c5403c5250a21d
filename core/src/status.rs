//! HTTP status code helpers.

/// True for 2xx codes.
pub fn is_success_status(code: i32) -> bool {
    (200..300).contains(&code)
}

/// Reason phrase for `code`, falling back to the status family for codes the
/// table does not list. Codes outside 100..=599 are "Unknown Status".
pub fn status_text(code: i32) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        507 => "Insufficient Storage",
        511 => "Network Authentication Required",
        100..=199 => "Informational",
        200..=299 => "Success",
        300..=399 => "Redirection",
        400..=499 => "Client Error",
        500..=599 => "Server Error",
        _ => "Unknown Status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        assert!(is_success_status(200));
        assert!(is_success_status(204));
        assert!(is_success_status(299));
        assert!(!is_success_status(199));
        assert!(!is_success_status(300));
        assert!(!is_success_status(404));
        assert!(!is_success_status(-1));
    }

    #[test]
    fn listed_codes_use_reason_phrase() {
        assert_eq!(status_text(200), "OK");
        assert_eq!(status_text(404), "Not Found");
        assert_eq!(status_text(503), "Service Unavailable");
    }

    #[test]
    fn unlisted_codes_fall_back_to_family() {
        assert_eq!(status_text(299), "Success");
        assert_eq!(status_text(399), "Redirection");
        assert_eq!(status_text(499), "Client Error");
        assert_eq!(status_text(599), "Server Error");
        assert_eq!(status_text(150), "Informational");
    }

    #[test]
    fn out_of_range_codes_are_unknown() {
        assert_eq!(status_text(999), "Unknown Status");
        assert_eq!(status_text(99), "Unknown Status");
        assert_eq!(status_text(-1), "Unknown Status");
        assert_eq!(status_text(600), "Unknown Status");
    }
}
