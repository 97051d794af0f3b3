// This software is released under the MIT license.
// See file LICENSE for full license details.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("File at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    FileNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error(
        "Read '{}' has a malformed barcode tag{}",
        read,
        Error::format_msg_as_detail(msg)
    )]
    MalformedBarcodeTag { read: String, msg: Option<String> },

    #[error("Ambiguous barcode definitions: {msg}")]
    AmbiguousBarcodes { msg: String },

    #[error("Failed parsing {}{}", context, Error::format_msg_as_detail(msg))]
    ParseError {
        context: String,
        msg: Option<String>,
    },
}

impl Error {
    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn file_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FileNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn malformed_barcode_tag<M: Into<String>>(read: &[u8], msg: Option<M>) -> Self {
        Error::MalformedBarcodeTag {
            read: String::from_utf8_lossy(read).into_owned(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn ambiguous_barcodes<M: Into<String>>(msg: M) -> Self {
        Error::AmbiguousBarcodes { msg: msg.into() }
    }

    #[cold]
    pub fn parse_error<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::ParseError {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}
