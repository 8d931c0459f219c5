//! Document text normalization
//!
//! Turns a raw `Key:value` document into the short, readable and anonymized
//! summary that is embedded in the completion prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Field names replaced by readable Spanish labels
pub const READABLE_FIELDS: &[(&str, &str)] = &[
    ("tipodte", "tipo de documento"),
    ("fchemis", "fecha de emision"),
    ("tpotrancompra", "tipo de transaccion de compra"),
    ("tpotranventa", "tipo de transaccion de venta"),
    ("fmapago", "forma de pago"),
    ("rznsocemisor", "razon social del emisor"),
    ("rznsocrecep", "razon social del receptor"),
    ("girorecep", "giro del receptor"),
    ("mntneto", "monto neto"),
    ("tasaiva", "tasa iva"),
    ("iva", "iva"),
    ("mnttotal", "monto total"),
    ("nrolindet", "linea del detalle"),
    ("nmbitem", "nombre del producto"),
    ("qtyitem", "cantidad del producto"),
    ("prcitem", "precio unitario"),
    ("montoitem", "monto del producto"),
];

const UNKNOWN_PARTY: &str = "Desconocido";
const UNSPECIFIED: &str = "No especificado";
const NO_PRODUCTS: &str = "Sin productos detectados";

static SELLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)razon social del emisor\s+(.+?)\s+rut del receptor").expect("valid regex")
});
static BUYER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)razon social del receptor\s+(.+?)\s+giro del receptor").expect("valid regex")
});
static GIRO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)giro del receptor\s+(.+?)\s+monto neto").expect("valid regex")
});
static FINAL_CONSUMER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)venta a consumidor final\s+(\w+)").expect("valid regex")
});
static PRODUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)nombre del producto\s+(.+?)\s+cantidad del producto").expect("valid regex")
});

fn readable_field(word: &str) -> Option<&'static str> {
    READABLE_FIELDS
        .iter()
        .find(|(field, _)| *field == word)
        .map(|(_, label)| *label)
}

/// Lowercase, strip accents and separators, anonymize RUTs
///
/// The value following `rutemisor`/`rutrecep` is replaced by a placeholder.
/// The receptor's giro is kept unless `anonymize_giro` is set. `b2c 1/0`
/// becomes `venta a consumidor final si/no`.
pub fn readable_and_anonymous(text: &str, anonymize_giro: bool) -> String {
    let lowered = text
        .to_lowercase()
        .replace([':', '/', '_'], " ");
    let ascii: String = lowered.nfkd().filter(char::is_ascii).collect();

    let words: Vec<&str> = ascii.split_whitespace().collect();
    let mut out: Vec<&str> = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        let next = words.get(i + 1).copied();
        match (word, next) {
            ("rutemisor", Some(_)) => {
                out.push("rut del emisor <RUT_EMISOR>");
                i += 2;
            }
            ("rutrecep", Some(_)) => {
                out.push("rut del receptor <RUT_RECEPTOR>");
                i += 2;
            }
            ("girorecep", Some(giro)) => {
                if anonymize_giro {
                    out.push("giro del receptor <GIRO_RECEPTOR>");
                } else {
                    out.push("giro del receptor");
                    out.push(giro);
                }
                i += 2;
            }
            ("b2c", Some(flag)) => {
                match flag {
                    "1" => out.push("venta a consumidor final si"),
                    "0" => out.push("venta a consumidor final no"),
                    _ => {}
                }
                i += 2;
            }
            _ => {
                out.push(readable_field(word).unwrap_or(word));
                i += 1;
            }
        }
    }
    out.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Five-line summary of a normalized document
///
/// ```
/// use rubro_pipeline::preprocess::summarize;
///
/// let summary = summarize("sin campos reconocibles");
/// assert!(summary.starts_with("Nombre del vendedor: Desconocido"));
/// ```
pub fn summarize(normalized: &str) -> String {
    let seller = capture(&SELLER_RE, normalized).unwrap_or_else(|| UNKNOWN_PARTY.to_string());
    let buyer = capture(&BUYER_RE, normalized).unwrap_or_else(|| UNKNOWN_PARTY.to_string());
    let giro = capture(&GIRO_RE, normalized).unwrap_or_else(|| UNSPECIFIED.to_string());
    let final_consumer = capture(&FINAL_CONSUMER_RE, normalized)
        .map(|v| capitalize(&v))
        .unwrap_or_else(|| UNSPECIFIED.to_string());
    let products: Vec<&str> = PRODUCT_RE
        .captures_iter(normalized)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let products = if products.is_empty() {
        NO_PRODUCTS.to_string()
    } else {
        products.join(", ")
    };

    format!(
        "Nombre del vendedor: {}\nNombre del comprador: {}\nGiro del comprador: {}\nVenta a consumidor final: {}\nProductos vendidos: {}",
        seller, buyer, giro, final_consumer, products
    )
}

/// Normalize a raw document and summarize it for the completion prompt
pub fn completion_input(raw: &str) -> String {
    summarize(&readable_and_anonymous(raw, false))
}
