//! Receipt retrieval and the local OCMF download

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::ports::SharedCheckoutApi;
use crate::domain::receipt::ReceiptSummary;
use crate::shared::errors::ApiResult;

pub struct ReceiptService {
    api: SharedCheckoutApi,
}

impl ReceiptService {
    pub fn new(api: SharedCheckoutApi) -> Self {
        Self { api }
    }

    /// One-shot receipt fetch. No polling here; a receipt that does not
    /// exist yet surfaces as `NotFound` with the backend's message.
    pub async fn fetch(&self, session_id: i64) -> ApiResult<ReceiptSummary> {
        let data = self.api.get_receipt(session_id).await?;
        let summary = ReceiptSummary::derive(&data);
        debug!(
            session_id,
            has_ocmf = summary.ocmf.is_some(),
            "Receipt derived"
        );
        Ok(summary)
    }
}

/// Write the decoded signed metering record to `ocmf_<receipt id>.txt` in
/// `dir`. Returns the written path, or `None` when the receipt carries no
/// OCMF data.
pub fn save_ocmf(summary: &ReceiptSummary, dir: &Path) -> io::Result<Option<PathBuf>> {
    let Some(ocmf) = summary.ocmf.as_deref() else {
        return Ok(None);
    };
    let path = dir.join(format!("ocmf_{}.txt", summary.receipt_id));
    std::fs::write(&path, ocmf)?;
    info!(path = %path.display(), "OCMF record written");
    Ok(Some(path))
}

// ── Tests ──────────────────────────────────────────────────────────────
