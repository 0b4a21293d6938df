//! End-to-end tests: synthetic service responses through extraction and
//! phrase matching.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use teor::{extract, matches, FailureKind};

const BOUNDARY: &str = "--uuid:6b3f0e2a-91c4-4d2e-b0a7-5f8e1c2d3a4b";

/// Build a response shaped like the one returned by consultarTeorComunicacao.
fn teor_response(cid: &str, body: &str) -> String {
    [
        BOUNDARY,
        "Content-Type: application/xop+xml; charset=UTF-8; type=\"text/xml\"",
        "Content-Transfer-Encoding: binary",
        "Content-ID: <root.message@cxf.apache.org>",
        "",
        &format!(
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>\
             <ns4:consultarTeorComunicacaoResposta><sucesso>true</sucesso>\
             <mensagem>Consulta realizada</mensagem><comunicacao><teor>\
             <xop:Include xmlns:xop=\"http://www.w3.org/2004/08/xop/include\" href=\"cid:{cid}\"/>\
             </teor></comunicacao></ns4:consultarTeorComunicacaoResposta></soap:Body></soap:Envelope>"
        ),
        BOUNDARY,
        "Content-Type: application/octet-stream",
        "Content-Transfer-Encoding: binary",
        &format!("Content-ID: <{cid}>"),
        "",
        body,
        &format!("{BOUNDARY}--"),
    ]
    .join("\r\n")
}

#[test]
fn test_base64_attachment_then_match() {
    let raw = teor_response("X", "PHA+QWdyYXZvPC9wPg==");

    let text = extract(&raw).expect("extraction should succeed");
    assert_eq!(text, "<p>Agravo</p>");
    assert!(matches(&text, "agravo"));
}

#[test]
fn test_unicode_round_trip_through_base64() {
    let original = "<html><body><p>Intimação: apresentar contrarrazões — prazo de 15 dias ✓</p></body></html>";
    let encoded = STANDARD.encode(original.as_bytes());
    // wrapped the way MIME encoders do
    let wrapped = encoded
        .as_bytes()
        .chunks(76)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("\r\n");

    let raw = teor_response("6f1d4a9e-teor@pje.jus.br", &wrapped);
    assert_eq!(extract(&raw).unwrap(), original);
}

#[test]
fn test_literal_markup_attachment_skips_base64() {
    // "<p>" would not survive a base64 decode, so success proves it was read literally
    let raw = teor_response("doc", "<p>Decis&atilde;o &amp; Senten&ccedil;a</p>");

    let text = extract(&raw).unwrap();
    assert_eq!(text, "<p>Decisão & Sentença</p>");
    assert!(matches(&text, "decisão & sentença"));
}

#[test]
fn test_latin1_attachment_still_succeeds() {
    let encoded = STANDARD.encode(b"<p>Contrarraz\xf5es</p>");
    let raw = teor_response("doc", &encoded);

    let text = extract(&raw).unwrap();
    assert_eq!(text, "<p>Contrarrazões</p>");
    assert!(matches(&text, "CONTRARRAZÕES"));
}

#[test]
fn test_soap_fault_without_boundary_is_not_multipart() {
    let raw = "<soap:Envelope><soap:Body><soap:Fault><faultstring>Usuario invalido</faultstring>\
               </soap:Fault></soap:Body></soap:Envelope>";

    let err = extract(raw).unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotMultipart);
    assert!(err.raw_payload().unwrap().contains("Usuario invalido"));
}

#[test]
fn test_phrase_split_by_other_words_does_not_match() {
    let encoded = STANDARD.encode("<p>apresentar algo e depois contrarrazões</p>");
    let raw = teor_response("doc", &encoded);

    let text = extract(&raw).unwrap();
    assert!(!matches(&text, "apresentar contrarrazões"));
    assert!(matches(&text, "depois contrarrazões"));
}
