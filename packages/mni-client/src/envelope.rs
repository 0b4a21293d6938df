//! Request templates and response field reading for MNI 2.2.2.
//!
//! Only two operations are used: `consultarTeorComunicacao` and
//! `entregarManifestacaoProcessual`. Responses are read by element name,
//! ignoring namespace prefixes, which works the same whether the body is a
//! plain SOAP envelope or the root part of an MTOM multipart.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use html_escape::{encode_double_quoted_attribute, encode_text};
use lazy_static::lazy_static;
use regex::Regex;

use crate::credentials::Credentials;
use crate::error::{MniError, Result};
use crate::types::{FilingReceipt, SignedDocument};

lazy_static! {
    static ref FAULT_REGEX: Regex =
        Regex::new(r"(?s)<(?:[\w.-]+:)?faultstring(?:\s[^>]*)?>(.*?)</(?:[\w.-]+:)?faultstring>")
            .expect("valid regex");
}

const ENVELOPE_NAMESPACES: &str = concat!(
    r#"xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
    r#"xmlns:ser="http://www.cnj.jus.br/servico-intercomunicacao-2.2.2/" "#,
    r#"xmlns:tip="http://www.cnj.jus.br/tipos-servico-intercomunicacao-2.2.2" "#,
    r#"xmlns:int="http://www.cnj.jus.br/intercomunicacao-2.2.2""#,
);

/// `AAAAMMDDHHMMSS`, the MNI timestamp format.
const MNI_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

fn wrap(body: &str) -> String {
    format!(
        "<soapenv:Envelope {ENVELOPE_NAMESPACES}>\
         <soapenv:Header/>\
         <soapenv:Body>{body}</soapenv:Body>\
         </soapenv:Envelope>"
    )
}

/// `consultarTeorComunicacao` request for one notice.
pub fn notice_content_request(
    credentials: &Credentials,
    case_number: &str,
    notice_id: &str,
) -> String {
    wrap(&format!(
        "<ser:consultarTeorComunicacao>\
         <tip:idConsultante>{id}</tip:idConsultante>\
         <tip:senhaConsultante>{password}</tip:senhaConsultante>\
         <tip:numeroProcesso>{case}</tip:numeroProcesso>\
         <tip:identificadorAviso>{notice}</tip:identificadorAviso>\
         </ser:consultarTeorComunicacao>",
        id = encode_text(credentials.id()),
        password = encode_text(credentials.expose_password()),
        case = encode_text(case_number),
        notice = encode_text(notice_id),
    ))
}

/// `entregarManifestacaoProcessual` request carrying a signed document.
pub fn filing_request(
    credentials: &Credentials,
    case_number: &str,
    document: &SignedDocument,
    sent_at: NaiveDateTime,
) -> String {
    let timestamp = sent_at.format(MNI_DATETIME_FORMAT).to_string();
    wrap(&format!(
        "<ser:entregarManifestacaoProcessual>\
         <tip:idManifestante>{id}</tip:idManifestante>\
         <tip:senhaManifestante>{password}</tip:senhaManifestante>\
         <tip:numeroProcesso>{case}</tip:numeroProcesso>\
         <tip:documento tipoDocumento=\"{doc_type}\" dataHora=\"{timestamp}\" \
         mimetype=\"{mime}\" nivelSigilo=\"0\" descricao=\"{description}\">\
         <int:conteudo>{content}</int:conteudo>\
         </tip:documento>\
         <tip:dataEnvio>{timestamp}</tip:dataEnvio>\
         </ser:entregarManifestacaoProcessual>",
        id = encode_text(credentials.id()),
        password = encode_text(credentials.expose_password()),
        case = encode_text(case_number),
        doc_type = encode_double_quoted_attribute(&document.document_type),
        mime = encode_double_quoted_attribute(&document.mime_type),
        description = encode_double_quoted_attribute(document.description()),
        content = STANDARD.encode(&document.content),
    ))
}

/// Text of the first element named `name`, entities decoded.
fn element_text(body: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r"(?s)<(?:[\w.-]+:)?{name}(?:\s[^>]*)?>(.*?)</(?:[\w.-]+:)?{name}>",
        name = regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str().trim()).into_owned())
}

/// `faultstring` of a SOAP fault, if the body is one.
pub fn fault_string(body: &str) -> Option<String> {
    FAULT_REGEX
        .captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| html_escape::decode_html_entities(m.as_str().trim()).into_owned())
}

/// Read the `entregarManifestacaoProcessualResposta` fields.
pub fn parse_filing_response(body: &str) -> Result<FilingReceipt> {
    if let Some(fault) = fault_string(body) {
        return Err(MniError::Fault(fault));
    }

    let success = element_text(body, "sucesso").ok_or_else(|| {
        MniError::MalformedResponse("missing sucesso element in filing response".to_string())
    })?;
    let message = element_text(body, "mensagem").unwrap_or_default();

    if !success.eq_ignore_ascii_case("true") {
        return Err(MniError::Rejected { message });
    }

    Ok(FilingReceipt {
        protocol: element_text(body, "protocoloRecebimento").filter(|p| !p.is_empty()),
        message,
        received_at: element_text(body, "dataOperacao").filter(|d| !d.is_empty()),
    })
}
