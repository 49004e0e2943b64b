pub mod highlight;
pub mod lexer;
pub mod parser;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use crate::highlight::{Highlight, Palette, Span};
pub use crate::lexer::{scan, Token, TokenKind};
pub use crate::parser::{check, SyntaxError};

// Initialize panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyntaxCheckResult {
    pub valid: bool,
    pub errors: Vec<ErrorInfo>,
}

/// Scans and checks `code`, reporting at most one error.
pub fn syntax_check(code: &str) -> SyntaxCheckResult {
    match check(&scan(code)) {
        Ok(()) => SyntaxCheckResult {
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => SyntaxCheckResult {
            valid: false,
            errors: vec![ErrorInfo {
                message: e.to_string(),
            }],
        },
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Editor-side entry point. The editor calls [`SyntaxHighlighter::highlight`]
/// with the whole buffer on every change.
#[wasm_bindgen]
#[derive(Default)]
pub struct SyntaxHighlighter {
    last: Option<Highlight>,
}

#[wasm_bindgen]
impl SyntaxHighlighter {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SyntaxHighlighter {
        SyntaxHighlighter { last: None }
    }

    /// Spans, verdict and first error for the trimmed buffer
    #[wasm_bindgen]
    pub fn highlight(&mut self, code: &str) -> JsValue {
        let report = Highlight::analyze(code);
        let value = to_js(&report);
        self.last = Some(report);
        value
    }

    #[wasm_bindgen]
    pub fn tokenize(&self, code: &str) -> JsValue {
        to_js(&scan(code))
    }

    /// Check syntax without highlighting
    #[wasm_bindgen]
    pub fn check_syntax(&self, code: &str) -> JsValue {
        to_js(&syntax_check(code))
    }

    /// Window title for the last highlighted buffer
    #[wasm_bindgen]
    pub fn title(&self) -> String {
        match &self.last {
            Some(report) => report.title(),
            None => highlight::TITLE.to_string(),
        }
    }
}
