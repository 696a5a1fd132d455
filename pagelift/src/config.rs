use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_GCS_BASE_URL: &str = "https://storage.googleapis.com";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn non_empty_var(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub processing: ProcessingConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Parent directory for per-invocation scratch roots.
    pub scratch_dir: PathBuf,
    pub dpi: u16,
    /// Directory containing libpdfium. Falls back to the system library.
    pub pdfium_library_path: Option<String>,
    /// Ignore events for objects under the service's own output prefixes.
    pub skip_output_objects: bool,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub languages: String,
    pub data_path: Option<String>,
    /// Tesseract binary used for orientation and script detection.
    pub tesseract_cmd: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub auth: StorageAuth,
    pub timeout_secs: u64,
}

/// How the storage client obtains its bearer token.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageAuth {
    /// No Authorization header (emulators, public test buckets).
    Anonymous,
    Static(String),
    /// Fetch a token from the instance metadata server on every call.
    Metadata { host: String },
}

impl fmt::Debug for StorageAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageAuth::Anonymous => write!(f, "Anonymous"),
            StorageAuth::Static(_) => write!(f, "Static(<redacted>)"),
            StorageAuth::Metadata { host } => f.debug_struct("Metadata").field("host", host).finish(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            scratch_dir: env::temp_dir(),
            dpi: 300,
            pdfium_library_path: None,
            skip_output_objects: true,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "eng".to_string(),
            data_path: None,
            tesseract_cmd: "tesseract".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 8080),
            },
            processing: ProcessingConfig {
                scratch_dir: non_empty_var("SCRATCH_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(env::temp_dir),
                dpi: parse_env_or("RASTER_DPI", 300),
                pdfium_library_path: non_empty_var("PDFIUM_LIBRARY_PATH"),
                skip_output_objects: parse_env_or("SKIP_OUTPUT_OBJECTS", true),
            },
            ocr: OcrConfig {
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                data_path: non_empty_var("TESSDATA_PREFIX"),
                tesseract_cmd: env::var("TESSERACT_CMD")
                    .unwrap_or_else(|_| "tesseract".to_string()),
            },
            storage: storage_from_env(),
        }
    }
}

fn storage_from_env() -> StorageConfig {
    let timeout_secs = parse_env_or("STORAGE_TIMEOUT", 120);

    if let Some(host) = non_empty_var("STORAGE_EMULATOR_HOST") {
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("http://{host}")
        };
        return StorageConfig {
            base_url,
            auth: StorageAuth::Anonymous,
            timeout_secs,
        };
    }

    let auth = match non_empty_var("GCS_ACCESS_TOKEN") {
        Some(token) => StorageAuth::Static(token),
        None => StorageAuth::Metadata {
            host: non_empty_var("GCE_METADATA_HOST")
                .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string()),
        },
    };

    StorageConfig {
        base_url: non_empty_var("GCS_BASE_URL").unwrap_or_else(|| DEFAULT_GCS_BASE_URL.to_string()),
        auth,
        timeout_secs,
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
