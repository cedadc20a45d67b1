use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Everything that can abort a run, grouped so the caller can tell input
/// problems, rendering problems and compiler problems apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not open spreadsheet {}: {source}", .path.display())]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{0}' not found in spreadsheet")]
    SheetNotFound(String),

    #[error("expected column '{0}' not found in the header row")]
    MissingColumn(&'static str),

    #[error("receipts directory {} does not exist", .0.display())]
    ReceiptsDirMissing(PathBuf),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("compiler '{0}' not found (is it installed and on PATH?)")]
    CompilerNotFound(String),

    #[error("compiler failed ({status}):\n{diagnostic}")]
    CompilerFailed {
        status: ExitStatus,
        diagnostic: String,
    },

    #[error("compiler did not finish within {0:?} and was killed")]
    CompilerTimeout(Duration),

    #[error("compiler reported success but produced no output at {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code per error category: 2 input, 3 render, 4 compile,
    /// 1 everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Spreadsheet { .. }
            | Error::SheetNotFound(_)
            | Error::MissingColumn(_)
            | Error::ReceiptsDirMissing(_) => 2,
            Error::Template(_) => 3,
            Error::CompilerNotFound(_)
            | Error::CompilerFailed { .. }
            | Error::CompilerTimeout(_)
            | Error::MissingArtifact(_) => 4,
            Error::Io(_) => 1,
        }
    }
}
