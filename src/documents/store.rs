//! File area for rendered documents.
//!
//! Files are named `<prefix>_<businessKey>_<epochMillis>.pdf`; the directory listing is
//! the only index. Lookups by business key return the first matching file in listing
//! order, and listings read creation times from filesystem metadata.

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use utoipa::ToSchema;

use super::common::{invoice_number, month_name};
use super::DocumentError;

/// Upper bound on millisecond bumps when names collide.
const MAX_NAME_ATTEMPTS: i64 = 1000;

pub const STATUS_GENERATED: &str = "GENERADA";

lazy_static! {
    static ref RECEIPT_NAME: Regex = Regex::new(r"^comprobante_nomina_(\d+)_(\d+)\.pdf$").unwrap();
    static ref INVOICE_NAME: Regex = Regex::new(r"^factura_nomina_(\d+)_(\d+)\.pdf$").unwrap();
    static ref EXPENSE_REPORT_NAME: Regex = Regex::new(r"^reporte_egresos_(\d+)\.pdf$").unwrap();
    static ref MONTHLY_REPORT_NAME: Regex =
        Regex::new(r"^reporte_mensual_(\d{1,2})_(\d{4})_(\d+)\.pdf$").unwrap();
    static ref LEGACY_MONTHLY_REPORT_NAME: Regex =
        Regex::new(r"^reporte_nominas_(\d{4})_(\d{1,2})_(\d+)\.pdf$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Receipt,
    Invoice,
    ExpenseReport,
    MonthlyReport,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Receipt => "comprobante_nomina",
            Self::Invoice => "factura_nomina",
            Self::ExpenseReport => "reporte_egresos",
            Self::MonthlyReport => "reporte_mensual",
        }
    }

    /// Directory new files are written to.
    pub fn directory(self) -> &'static str {
        self.read_directories()[0]
    }

    /// Directories scanned on read. Legacy monthly reports were written next to invoices.
    fn read_directories(self) -> &'static [&'static str] {
        match self {
            Self::Receipt | Self::Invoice => &["facturas"],
            Self::ExpenseReport => &["egresos"],
            Self::MonthlyReport => &["egresos", "facturas"],
        }
    }

    pub fn file_name(self, business_key: Option<&str>, millis: i64) -> String {
        match business_key {
            Some(key) => format!("{}_{}_{}.pdf", self.prefix(), key, millis),
            None => format!("{}_{}.pdf", self.prefix(), millis),
        }
    }

    /// Substrings identifying files that belong to `business_key`.
    fn key_markers(self, business_key: &str) -> Vec<String> {
        let mut markers = vec![format!("{}_{}_", self.prefix(), business_key)];
        if self == Self::MonthlyReport {
            if let Some((month, year)) = business_key.split_once('_') {
                markers.push(format!("reporte_nominas_{}_{}_", year, month));
            }
        }
        markers
    }

    /// Business key and generation millis recovered from a file name.
    pub fn parse_file_name(self, name: &str) -> Option<(Option<String>, i64)> {
        match self {
            Self::Receipt => parse_keyed(&RECEIPT_NAME, name),
            Self::Invoice => parse_keyed(&INVOICE_NAME, name),
            Self::ExpenseReport => {
                let caps = EXPENSE_REPORT_NAME.captures(name)?;
                Some((None, caps[1].parse().ok()?))
            }
            Self::MonthlyReport => {
                if let Some(caps) = MONTHLY_REPORT_NAME.captures(name) {
                    let month: u32 = caps[1].parse().ok()?;
                    let year: i32 = caps[2].parse().ok()?;
                    return Some((Some(monthly_key(month, year)), caps[3].parse().ok()?));
                }
                let caps = LEGACY_MONTHLY_REPORT_NAME.captures(name)?;
                let year: i32 = caps[1].parse().ok()?;
                let month: u32 = caps[2].parse().ok()?;
                Some((Some(monthly_key(month, year)), caps[3].parse().ok()?))
            }
        }
    }

    fn label(self, business_key: Option<&str>) -> String {
        match (self, business_key) {
            (Self::Invoice, Some(key)) => match key.parse::<i32>() {
                Ok(id) => invoice_number(id),
                Err(_) => key.to_string(),
            },
            (Self::Receipt, Some(key)) => format!("Comprobante pago {}", key),
            (Self::MonthlyReport, Some(key)) => {
                let named = key.split_once('_').and_then(|(month, year)| {
                    let month = month_name(month.parse().ok()?)?;
                    Some(format!("Reporte mensual {} {}", month, year))
                });
                named.unwrap_or_else(|| format!("Reporte mensual {}", key))
            }
            (Self::ExpenseReport, _) => "Reporte general de egresos".to_string(),
            (_, None) => self.prefix().to_string(),
        }
    }
}

fn parse_keyed(pattern: &Regex, name: &str) -> Option<(Option<String>, i64)> {
    let caps = pattern.captures(name)?;
    Some((Some(caps[1].to_string()), caps[2].parse().ok()?))
}

/// Business key of a monthly report, e.g. `3_2025`.
pub fn monthly_key(month: u32, year: i32) -> String {
    format!("{}_{}", month, year)
}

/// A document file found on disk.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub kind: DocumentKind,
    pub business_key: Option<String>,
    pub label: String,
    pub archivo: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Generation time encoded in the file name.
    pub issued_at: Option<DateTime<Utc>>,
    /// Creation time reported by the filesystem.
    pub fecha_creacion: DateTime<Utc>,
    pub size: u64,
    pub estado: String,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn directory(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.directory())
    }

    pub async fn save(
        &self,
        kind: DocumentKind,
        business_key: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredDocument, DocumentError> {
        self.save_rendered(kind, business_key, Utc::now(), |_| Ok(bytes.to_vec()))
            .await
    }

    /// Reserves a unique file name at or after `at`, then renders with the
    /// timestamp actually reserved and writes the bytes.
    ///
    /// Two calls landing on the same millisecond get distinct files: the name is
    /// created with create-if-absent semantics and the millisecond component is
    /// advanced on collision. A failed render removes the reserved file.
    pub async fn save_rendered<F>(
        &self,
        kind: DocumentKind,
        business_key: Option<&str>,
        at: DateTime<Utc>,
        render: F,
    ) -> Result<StoredDocument, DocumentError>
    where
        F: FnOnce(DateTime<Utc>) -> Result<Vec<u8>, DocumentError>,
    {
        let dir = self.directory(kind);
        fs::create_dir_all(&dir).await?;

        let (mut file, path, millis) = reserve(&dir, kind, business_key, at.timestamp_millis()).await?;
        let issued_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or(at);

        let bytes = match render(issued_at) {
            Ok(bytes) => bytes,
            Err(err) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    log::warn!("Could not remove reserved file {}: {}", path.display(), cleanup);
                }
                return Err(err);
            }
        };
        file.write_all(&bytes).await?;
        file.flush().await?;
        log::info!("Stored {} ({} bytes)", path.display(), bytes.len());

        let archivo = kind.file_name(business_key, millis);
        Ok(StoredDocument {
            kind,
            business_key: business_key.map(str::to_string),
            label: kind.label(business_key),
            archivo,
            path,
            issued_at: Some(issued_at),
            fecha_creacion: issued_at,
            size: bytes.len() as u64,
            estado: STATUS_GENERATED.to_string(),
        })
    }

    /// First file in listing order whose name carries `business_key`.
    pub async fn find_by_business_key(
        &self,
        kind: DocumentKind,
        business_key: &str,
    ) -> Result<Option<PathBuf>, DocumentError> {
        let markers = kind.key_markers(business_key);
        for dir in kind.read_directories() {
            let dir = self.root.join(dir);
            for name in read_names(&dir).await? {
                if markers.iter().any(|marker| name.contains(marker.as_str())) {
                    log::debug!("Found {} for key {}", name, business_key);
                    return Ok(Some(dir.join(name)));
                }
            }
        }
        Ok(None)
    }

    /// Every file following the kind's naming convention, newest first.
    pub async fn list(&self, kind: DocumentKind) -> Result<Vec<StoredDocument>, DocumentError> {
        let mut documents = Vec::new();
        for dir in kind.read_directories() {
            let dir = self.root.join(dir);
            for name in read_names(&dir).await? {
                let Some((business_key, millis)) = kind.parse_file_name(&name) else {
                    continue;
                };
                let path = dir.join(&name);
                let metadata = fs::metadata(&path).await?;
                let created = metadata.created().or_else(|_| metadata.modified())?;
                documents.push(StoredDocument {
                    kind,
                    label: kind.label(business_key.as_deref()),
                    business_key,
                    archivo: name,
                    path,
                    issued_at: Utc.timestamp_millis_opt(millis).single(),
                    fecha_creacion: DateTime::<Utc>::from(created),
                    size: metadata.len(),
                    estado: STATUS_GENERATED.to_string(),
                });
            }
        }
        documents.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
        Ok(documents)
    }
}

async fn reserve(
    dir: &Path,
    kind: DocumentKind,
    business_key: Option<&str>,
    start_millis: i64,
) -> Result<(fs::File, PathBuf, i64), DocumentError> {
    for offset in 0..MAX_NAME_ATTEMPTS {
        let millis = start_millis + offset;
        let path = dir.join(kind.file_name(business_key, millis));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((file, path, millis)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} exists, advancing timestamp", path.display());
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(DocumentError::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free document name in {}", dir.display()),
    )))
}

/// File names in `dir`; a missing directory has none.
async fn read_names(dir: &Path) -> Result<Vec<String>, DocumentError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}
