//! Delimited dataset loading.
//!
//! Catalog files have been republished under several header spellings over
//! the years, so every logical field resolves through an alias table. Header
//! matching ignores a leading BOM, surrounding whitespace and ASCII case. The
//! delimiter is a comma unless the header line clearly uses `;`, `|` or tabs.

use std::collections::HashMap;
use std::path::Path;

use nom024_model::{CatalogEntry, CatalogType, EntryAttributes};
use sha2::Digest;

use crate::config::{CatalogSource, SourceDefaults};
use crate::error::{CatalogError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Rows parsed from one dataset, in file order.
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub entries: Vec<CatalogEntry>,
    /// Rows dropped for lacking a code or description, or failing to decode.
    pub skipped_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Code,
    Description,
    Source,
    Version,
    Sex,
    MinAge,
    MaxAge,
    Abbreviation,
    State,
    Municipality,
    Status,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Description => "description",
            Self::Source => "source",
            Self::Version => "version",
            Self::Sex => "lsex",
            Self::MinAge => "linf",
            Self::MaxAge => "lsup",
            Self::Abbreviation => "abbreviation",
            Self::State => "state",
            Self::Municipality => "municipality",
            Self::Status => "status",
        }
    }
}

/// Header spellings accepted for `field` in `catalog`, in preference order.
fn aliases(catalog: CatalogType, field: Field) -> &'static [&'static str] {
    use CatalogType as C;
    match (field, catalog) {
        (Field::Source, _) => &["FUENTE", "SOURCE"],
        (Field::Version, _) => &["VERSION"],

        (Field::Code, C::Diagnoses) => &["CATALOG_KEY", "CLAVE", "CODIGO", "CODE"],
        (Field::Description, C::Diagnoses) => &["NOMBRE", "DESCRIPCION", "DESCRIPTION"],
        (Field::Sex, C::Diagnoses) => &["LSEX", "SEXO"],
        (Field::MinAge, C::Diagnoses) => &["LINF"],
        (Field::MaxAge, C::Diagnoses) => &["LSUP"],

        (Field::Code, C::FederalEntities) => &["CATALOG_KEY", "CVE_ENT", "CLAVE_ENTIDAD"],
        (Field::Description, C::FederalEntities) => {
            &["ENTIDAD_FEDERATIVA", "NOM_ENT", "NOMBRE"]
        }
        (Field::Abbreviation, C::FederalEntities) => &["ABREVIATURA", "ABR"],

        (Field::Code, C::Municipalities) => &["CATALOG_KEY", "CVE_MUN", "CLAVE_MUNICIPIO"],
        (Field::Description, C::Municipalities) => &["MUNICIPIO", "NOM_MUN", "NOMBRE"],
        (Field::State, C::Municipalities) => &["EFE_KEY", "CVE_ENT", "CLAVE_ENTIDAD"],

        (Field::Code, C::Localities) => &["CATALOG_KEY", "CVE_LOC", "CLAVE_LOCALIDAD"],
        (Field::Description, C::Localities) => &["LOCALIDAD", "NOM_LOC", "NOMBRE"],
        (Field::State, C::Localities) => &["EFE_KEY", "CVE_ENT", "CLAVE_ENTIDAD"],
        (Field::Municipality, C::Localities) => &["MUN_KEY", "CVE_MUN", "CLAVE_MUNICIPIO"],

        (Field::Code, C::PostalCodes) => &["D_CODIGO", "CODIGO_POSTAL", "CP"],
        (Field::Description, C::PostalCodes) => &["D_ASENTA", "ASENTAMIENTO", "COLONIA"],
        (Field::State, C::PostalCodes) => &["C_ESTADO", "CVE_ENT"],
        (Field::Municipality, C::PostalCodes) => &["C_MNPIO", "CVE_MUN"],

        (Field::Code, C::Nationalities) => {
            &["CODIGO_PAIS", "CLAVE_NACIONALIDAD", "CATALOG_KEY", "CLAVE"]
        }
        (Field::Description, C::Nationalities) => &["PAIS", "NACIONALIDAD", "DESCRIPCION"],

        (Field::Code, C::Religions) => &["CLAVE_RELIGION", "CATALOG_KEY", "CLAVE"],
        (Field::Description, C::Religions) => &["RELIGION", "DESCRIPCION"],

        (Field::Code, C::IndigenousLanguages) => &["CLAVE_LENGUA", "CATALOG_KEY", "CLAVE"],
        (Field::Description, C::IndigenousLanguages) => {
            &["LENGUA", "LENGUA_INDIGENA", "DESCRIPCION"]
        }

        (Field::Code, C::AcademicBackground) => &["CLAVE_FORMACION", "CATALOG_KEY", "CLAVE"],
        (Field::Description, C::AcademicBackground) => {
            &["FORMACION", "FORMACION_ACADEMICA", "DESCRIPCION"]
        }

        (Field::Code, C::Establishments) => &["CLUES"],
        (Field::Description, C::Establishments) => {
            &["NOMBRE DE LA UNIDAD", "NOMBRE_UNIDAD", "NOMBRE"]
        }
        (Field::Status, C::Establishments) => {
            &["ESTATUS DE OPERACION", "ESTATUS_OPERACION", "ESTATUS"]
        }
        (Field::State, C::Establishments) => &["CLAVE DE LA ENTIDAD", "CVE_ENT"],

        (Field::Code, C::Procedures | C::Affiliations | C::PersonnelTypes) => {
            &["CATALOG_KEY", "CLAVE"]
        }
        (Field::Description, C::Procedures | C::Affiliations | C::PersonnelTypes) => {
            &["DESCRIPCION", "NOMBRE", "PRO_NOMBRE"]
        }

        _ => &[],
    }
}

/// Logical field → column position for one file.
struct Columns {
    positions: HashMap<Field, usize>,
}

impl Columns {
    fn resolve(catalog: CatalogType, headers: &csv::StringRecord) -> Self {
        let folded: Vec<String> = headers.iter().map(fold_header).collect();
        let fields = [
            Field::Code,
            Field::Description,
            Field::Source,
            Field::Version,
            Field::Sex,
            Field::MinAge,
            Field::MaxAge,
            Field::Abbreviation,
            Field::State,
            Field::Municipality,
            Field::Status,
        ];
        let positions = fields
            .into_iter()
            .filter_map(|field| {
                aliases(catalog, field)
                    .iter()
                    .find_map(|alias| folded.iter().position(|h| h.eq_ignore_ascii_case(alias)))
                    .map(|idx| (field, idx))
            })
            .collect();
        Self { positions }
    }

    fn has(&self, field: Field) -> bool {
        self.positions.contains_key(&field)
    }

    fn get(&self, record: &csv::StringRecord, field: Field) -> Option<String> {
        self.positions
            .get(&field)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

fn fold_header(header: &str) -> String {
    header.trim_matches('\u{feff}').trim().to_string()
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Pick the delimiter from the first non-blank line.
pub fn detect_delimiter(content: &[u8]) -> u8 {
    let header = content
        .split(|&b| b == b'\n')
        .find(|line| !line.iter().all(u8::is_ascii_whitespace))
        .unwrap_or_default();
    let count = |delimiter: u8| header.iter().filter(|&&b| b == delimiter).count();
    let commas = count(b',');
    [b';', b'|', b'\t']
        .into_iter()
        .map(|delimiter| (delimiter, count(delimiter)))
        .filter(|&(_, n)| n > commas)
        .max_by_key(|&(_, n)| n)
        .map_or(b',', |(delimiter, _)| delimiter)
}

/// Lower-case hex SHA-256 digest, as pinned in manifests.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}

/// Read, verify and parse one configured catalog file.
pub fn load_catalog(source: &CatalogSource) -> Result<ParsedCatalog> {
    let bytes = std::fs::read(&source.path).map_err(|e| CatalogError::io(&source.path, e))?;
    if let Some(expected) = &source.sha256 {
        let actual = sha256_hex(&bytes);
        if &actual != expected {
            return Err(CatalogError::Sha256Mismatch {
                path: source.path.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }
    parse_catalog(source.catalog, &bytes, &source.path, &source.defaults)
}

/// Parse dataset bytes into entries.
///
/// Fails only when the header cannot be read or lacks a code or description
/// column. Individual bad rows are counted and skipped.
pub fn parse_catalog(
    catalog: CatalogType,
    bytes: &[u8],
    path: &Path,
    defaults: &SourceDefaults,
) -> Result<ParsedCatalog> {
    let content = strip_bom(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(detect_delimiter(content))
        .from_reader(content);

    let headers = reader
        .headers()
        .map_err(|e| CatalogError::csv(path, &e))?
        .clone();
    let columns = Columns::resolve(catalog, &headers);
    for required in [Field::Code, Field::Description] {
        if !columns.has(required) {
            return Err(CatalogError::MissingColumn {
                catalog,
                path: path.to_path_buf(),
                field: required.label(),
            });
        }
    }

    let mut parsed = ParsedCatalog::default();
    for (row_idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(error) => {
                tracing::debug!(
                    catalog = %catalog,
                    row = row_idx + 1,
                    %error,
                    "skipping unreadable row"
                );
                parsed.skipped_rows += 1;
                continue;
            }
        };
        match map_row(catalog, &columns, &record, defaults) {
            Some(entry) => parsed.entries.push(entry),
            None => parsed.skipped_rows += 1,
        }
    }
    Ok(parsed)
}

/// Parse in-memory CSV text, mainly for fixtures.
pub fn parse_catalog_str(catalog: CatalogType, content: &str) -> Result<ParsedCatalog> {
    parse_catalog(
        catalog,
        content.as_bytes(),
        Path::new("<memory>"),
        &SourceDefaults::default(),
    )
}

fn map_row(
    catalog: CatalogType,
    columns: &Columns,
    record: &csv::StringRecord,
    defaults: &SourceDefaults,
) -> Option<CatalogEntry> {
    let code = columns.get(record, Field::Code)?;
    let description = columns.get(record, Field::Description)?;
    let state = || columns.get(record, Field::State).map(|s| s.to_uppercase());
    let municipality = || columns.get(record, Field::Municipality);

    let (code, attributes) = match catalog {
        CatalogType::Diagnoses => (
            normalize_diagnosis_key(&code),
            EntryAttributes::Diagnosis {
                lsex: columns.get(record, Field::Sex),
                linf: columns.get(record, Field::MinAge),
                lsup: columns.get(record, Field::MaxAge),
            },
        ),
        CatalogType::FederalEntities => (
            code.to_uppercase(),
            EntryAttributes::FederalEntity {
                abbreviation: columns.get(record, Field::Abbreviation),
            },
        ),
        CatalogType::Municipalities => (
            code,
            EntryAttributes::Municipality {
                state_code: state(),
            },
        ),
        CatalogType::Localities => (
            code,
            EntryAttributes::Locality {
                state_code: state(),
                municipality_code: municipality(),
            },
        ),
        CatalogType::PostalCodes => (
            code,
            EntryAttributes::PostalCode {
                state_code: state(),
                municipality_code: municipality(),
            },
        ),
        CatalogType::Establishments => (
            code.to_uppercase(),
            EntryAttributes::Establishment {
                operational_status: columns.get(record, Field::Status),
                state_code: state(),
            },
        ),
        CatalogType::Nationalities
        | CatalogType::Religions
        | CatalogType::IndigenousLanguages
        | CatalogType::AcademicBackground
        | CatalogType::Procedures
        | CatalogType::Affiliations
        | CatalogType::PersonnelTypes => (code, EntryAttributes::Plain),
    };

    let source = columns
        .get(record, Field::Source)
        .or_else(|| defaults.source.clone());
    let version = columns
        .get(record, Field::Version)
        .or_else(|| defaults.version.clone());
    Some(CatalogEntry::new(code, description, attributes).with_source(source, version))
}

/// CIE-10 keys are stored upper-case without `.` separators.
pub fn normalize_diagnosis_key(code: &str) -> String {
    code.trim().replace('.', "").to_uppercase()
}
