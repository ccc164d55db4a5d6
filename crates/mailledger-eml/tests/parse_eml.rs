//! Integration tests for EML parsing.
//!
//! The same logical body is sent through every transfer encoding and read
//! back from strings and from files.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use chrono::Local;
use mailledger_eml::{
    Config, Error, Message, MissingDatePolicy, Parser, Source, TransferEncoding, parse_from_file,
    parse_from_string,
};
use tracing_subscriber::filter::LevelFilter;

const DATE_LINE: &str = "Date: Wed, 01 Nov 2023 00:00:00 +0000\n";

const COMMON_HEADERS: &str = concat!(
    "MIME-Version: 1.0\n",
    "Message-ID: <20231101000000.4711@mailledger.test>\n",
    "User-Agent: mailledger-eml test suite\n",
    "From: \"Test Sender\" <sender@mailledger.test>\n",
    "To: <rcpt@mailledger.test>\n",
    "Cc: <copy@mailledger.test>\n",
    "Content-Type: text/plain; charset=UTF-8\n",
);

const BODY_TEXT: &str = concat!(
    "Hello team,\n",
    "\n",
    "This message checks that every transfer encoding decodes to the same text. ",
    "This sentence is long enough that it must be wrapped.\n",
    "\n",
    "Accents: café, naïve, Grüße.\n",
    "\n",
    "--\n",
    "The mailledger team",
);

const BODY_QP: &str = concat!(
    "Hello team,\n",
    "\n",
    "This message checks that every transfer encoding decodes to the same text. =\n",
    "This sentence is long enough that it must be wrapped.\n",
    "\n",
    "Accents: caf=C3=A9, na=C3=AFve, Gr=C3=BC=C3=9Fe.\n",
    "\n",
    "--\n",
    "The mailledger team",
);

const BODY_B64: &str = concat!(
    "SGVsbG8gdGVhbSwKClRoaXMgbWVzc2FnZSBjaGVja3MgdGhhdCBldmVyeSB0cmFuc2ZlciBlbmNv\n",
    "ZGluZyBkZWNvZGVzIHRvIHRoZSBzYW1lIHRleHQuIFRoaXMgc2VudGVuY2UgaXMgbG9uZyBlbm91\n",
    "Z2ggdGhhdCBpdCBtdXN0IGJlIHdyYXBwZWQuCgpBY2NlbnRzOiBjYWbDqSwgbmHDr3ZlLCBHcsO8\n",
    "w59lLgoKLS0KVGhlIG1haWxsZWRnZXIgdGVhbQ==",
);

/// One body encoding under test.
#[derive(Clone, Copy)]
struct Case {
    name: &'static str,
    token: &'static str,
    subject: &'static str,
    body: &'static str,
}

const CASES: [Case; 3] = [
    Case {
        name: "plain-8bit",
        token: "8bit",
        subject: "Example mail // plain text without encoding",
        body: BODY_TEXT,
    },
    Case {
        name: "plain-quoted-printable",
        token: "quoted-printable",
        subject: "Example mail // plain text quoted-printable",
        body: BODY_QP,
    },
    Case {
        name: "plain-base64",
        token: "base64",
        subject: "Example mail // plain text base64",
        body: BODY_B64,
    },
];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::DEBUG)
        .try_init();
}

fn eml(date_line: &str, case: &Case) -> String {
    format!(
        "{date_line}{COMMON_HEADERS}Subject: {subject}\nContent-Transfer-Encoding: {token}\n\n{body}",
        subject = case.subject,
        token = case.token,
        body = case.body,
    )
}

fn assert_parsed(message: &Message, case: &Case) {
    assert_eq!(message.encoding().as_str(), case.token, "{}", case.name);
    assert_eq!(message.body_text(), BODY_TEXT, "{}", case.name);

    let subject = message.generic_header("Subject");
    assert_eq!(subject.len(), 1, "{}", case.name);
    assert!(subject[0].eq_ignore_ascii_case(case.subject), "{}", case.name);
}

#[test]
fn test_parse_from_string_every_encoding() {
    init_tracing();

    for case in &CASES {
        let message = parse_from_string(&eml(DATE_LINE, case)).unwrap();
        assert_parsed(&message, case);
        assert_eq!(message.charset().as_deref(), Some("UTF-8"));
        assert_eq!(message.from(), Some("\"Test Sender\" <sender@mailledger.test>"));
        assert_eq!(message.generic_header("cc"), ["<copy@mailledger.test>"]);
        assert_eq!(message.date().unwrap().timestamp(), 1_698_796_800);
    }
}

#[test]
fn test_parse_from_file_every_encoding() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    for case in &CASES {
        let path = dir.path().join(format!("{}.eml", case.name));
        fs::write(&path, eml(DATE_LINE, case)).unwrap();

        let message = parse_from_file(&path).unwrap();
        assert_parsed(&message, case);
    }
}

#[test]
fn test_file_and_string_are_equivalent() {
    let dir = tempfile::tempdir().unwrap();

    for case in &CASES {
        let raw = eml(DATE_LINE, case);
        let path = dir.path().join(format!("{}.eml", case.name));
        fs::write(&path, &raw).unwrap();

        let from_string = parse_from_string(&raw).unwrap();
        let from_file = parse_from_file(&path).unwrap();
        let from_source = Parser::new().parse_source(&Source::File(path)).unwrap();

        assert_eq!(from_string.encoding(), from_file.encoding());
        assert_eq!(from_string.headers(), from_file.headers());
        assert_eq!(from_string, from_file);
        assert_eq!(from_file, from_source);
    }
}

#[test]
fn test_crlf_documents_parse_like_lf() {
    for case in &CASES {
        let lf = eml(DATE_LINE, case);
        let crlf = lf.replace('\n', "\r\n");

        let message = parse_from_string(&crlf).unwrap();
        assert_eq!(message.encoding().as_str(), case.token);
        assert_eq!(message.headers(), parse_from_string(&lf).unwrap().headers());
        // Base64 carries its own line endings inside the payload.
        let expected = if case.token == "base64" {
            BODY_TEXT.to_string()
        } else {
            BODY_TEXT.replace('\n', "\r\n")
        };
        assert_eq!(message.body_text(), expected);
    }
}

#[test]
fn test_header_lookup_ignores_case() {
    let message = parse_from_string(&eml(DATE_LINE, &CASES[2])).unwrap();

    let lower = message.generic_header("subject");
    assert_eq!(lower, ["Example mail // plain text base64"]);
    assert_eq!(message.generic_header("Subject"), lower);
    assert_eq!(message.generic_header("SUBJECT"), lower);
    assert_eq!(message.generic_header("sUbJeCt"), lower);
}

#[test]
fn test_missing_header_is_empty() {
    let message = parse_from_string(&eml(DATE_LINE, &CASES[0])).unwrap();

    assert!(message.generic_header("Reply-To").is_empty());
    assert!(message.generic_header("X-Priority").is_empty());
}

#[test]
fn test_invalid_date_is_rejected() {
    init_tracing();
    let raw = eml("Date: Inv, 99 Nov 9999 99:99:00 +0000\n", &CASES[0]);

    let err = parse_from_string(&raw).unwrap_err();
    assert!(matches!(err, Error::InvalidDate { .. }));
    assert!(err.to_string().contains("Inv, 99 Nov 9999"));
}

#[test]
fn test_missing_date_is_synthesized_from_system_clock() {
    init_tracing();
    let raw = eml("", &CASES[0]);

    let before = Local::now();
    let message = parse_from_string(&raw).unwrap();
    let after = Local::now();

    let dates = message.generic_header("Date");
    assert_eq!(dates.len(), 1);

    let stamped = chrono::DateTime::parse_from_rfc2822(&dates[0]).unwrap();
    assert!(stamped.timestamp() >= before.timestamp());
    assert!(stamped.timestamp() <= after.timestamp());
    assert_eq!(
        stamped.offset().local_minus_utc(),
        after.offset().local_minus_utc()
    );
    assert_eq!(dates[0], stamped.format("%a, %d %b %Y %H:%M:%S %z").to_string());
}

#[test]
fn test_missing_date_rejected_when_configured() {
    let config = Config::builder()
        .missing_date(MissingDatePolicy::Reject)
        .build();

    let err = Parser::with_config(config)
        .parse_str(&eml("", &CASES[1]))
        .unwrap_err();
    assert!(matches!(err, Error::MissingDate));
}

#[test]
fn test_corrupt_base64_body() {
    let mut case = CASES[2];
    case.body = "SGVsbG8*invalid*";

    let err = parse_from_string(&eml(DATE_LINE, &case)).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidEncodingPayload {
            encoding: TransferEncoding::Base64,
            ..
        }
    ));
}

#[test]
fn test_missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = parse_from_file(dir.path().join("nope.eml")).unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected I/O error, got {other:?}"),
    }
}

#[test]
fn test_parser_shared_across_threads() {
    let parser = Parser::new();

    std::thread::scope(|scope| {
        let handles: Vec<_> = CASES
            .iter()
            .map(|case| {
                let parser = &parser;
                scope.spawn(move || parser.parse_str(&eml(DATE_LINE, case)).map(|m| m.encoding()))
            })
            .collect();

        for (handle, case) in handles.into_iter().zip(&CASES) {
            let encoding = handle.join().expect("parser thread panicked").unwrap();
            assert_eq!(encoding.as_str(), case.token);
        }
    });
}
