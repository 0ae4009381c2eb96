use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A raw leaf value. `None` means the key was missing or null in the source.
pub type Field = Option<String>;

// ---------------------------------------------------------------------------
// Loose JSON decoding
// ---------------------------------------------------------------------------

/// Read any JSON scalar as text. Numbers keep their decimal rendering, null is absent.
fn loose_text<'de, D>(deserializer: D) -> Result<Field, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

/// Treat an explicit `null` block the same as a missing one.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record ids arrive as strings or integers. Null, `""`, `0` and `false` are absent.
/// The JSON type is part of the identity: `17` and `"17"` are different records.
fn record_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(RecordId::new(s)),
        Value::Number(n) => {
            let zero = n.as_f64().map(|f| f == 0.0).unwrap_or(false);
            (!zero).then(|| RecordId::numeric(n.to_string()))
        }
        Value::Bool(true) => Some(RecordId::new("true")),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Identifiers + closed vocabularies
// ---------------------------------------------------------------------------

/// Externally assigned household record identifier.
///
/// Serializes as its text; equality also compares whether the source was a
/// JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    text: String,
    numeric: bool,
}

impl RecordId {
    /// An id that arrived as a JSON string.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            text: id.into(),
            numeric: false,
        }
    }

    /// An id that arrived as a JSON number, kept in its decimal rendering.
    pub fn numeric(id: impl Into<String>) -> Self {
        Self {
            text: id.into(),
            numeric: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric
    }
}

impl Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Extraction outcome tag on a household record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Success,
    Other(String),
    Missing,
}

impl ExtractionStatus {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("success") => Self::Success,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Missing,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Relationship of a member to the household head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    /// "Kepala Keluarga"
    Head,
    /// "Istri"
    Spouse,
    Other(String),
    Unknown,
}

impl Relationship {
    pub const HEAD_CODE: &'static str = "Kepala Keluarga";
    pub const SPOUSE_CODE: &'static str = "Istri";

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some(Self::HEAD_CODE) => Self::Head,
            Some(Self::SPOUSE_CODE) => Self::Spouse,
            Some("") | None => Self::Unknown,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// Survey presence of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// "Ditemukan"
    Found,
    Other(String),
    Unknown,
}

impl Presence {
    pub const FOUND_CODE: &'static str = "Ditemukan";

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some(Self::FOUND_CODE) => Self::Found,
            Some("") | None => Self::Unknown,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Input documents
// ---------------------------------------------------------------------------

/// One extraction file's parsed content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    /// Where the document came from (file name). Set by the loader.
    #[serde(skip)]
    pub source: String,
    #[serde(default)]
    pub records: Vec<HouseholdRecord>,
    #[serde(default)]
    pub extraction_summary: Option<Value>,
}

impl RawDocument {
    /// Decode a document from JSON text.
    pub fn from_json(source: &str, json: &str) -> Result<Self, crate::CensusError> {
        let mut doc: RawDocument =
            serde_json::from_str(json).map_err(|e| crate::CensusError::DocumentParse {
                source: source.to_string(),
                message: e.to_string(),
            })?;
        doc.source = source.to_string();
        Ok(doc)
    }
}

/// What the loader hands to the reconciler: a parsed document, or the reason it failed.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    Parsed(RawDocument),
    Failed { source: String, reason: String },
}

impl DocumentInput {
    pub fn source(&self) -> &str {
        match self {
            Self::Parsed(doc) => &doc.source,
            Self::Failed { source, .. } => source,
        }
    }
}

/// Location block (`page1_blok_i`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "provinsi", default, deserialize_with = "loose_text")]
    pub region: Field,
    #[serde(rename = "kecamatan", default, deserialize_with = "loose_text")]
    pub sub_region: Field,
    #[serde(rename = "desa_kelurahan", default, deserialize_with = "loose_text")]
    pub sub_district: Field,
    #[serde(rename = "nks", default, deserialize_with = "loose_text")]
    pub cluster_code: Field,
}

/// Household block (`page2_blok_v`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Household {
    #[serde(rename = "nama_kepala_keluarga", default, deserialize_with = "loose_text")]
    pub head_name: Field,
    #[serde(rename = "keberadaan_keluarga", default, deserialize_with = "loose_text")]
    pub existence: Field,
    #[serde(rename = "alamat_tempat_tinggal", default, deserialize_with = "loose_text")]
    pub address: Field,
    #[serde(rename = "nomor_kartu_keluarga", default, deserialize_with = "loose_text")]
    pub family_card_number: Field,
    #[serde(rename = "jumlah_anggota_keluarga", default, deserialize_with = "loose_text")]
    pub member_count: Field,
    /// Ordering key only; never serialized.
    #[serde(rename = "nomor_urut_bangunan", default, deserialize_with = "loose_text", skip_serializing)]
    pub building_sequence: Field,
}

/// One household member (`art_details[].detail_data`, plus the entry's `art_info` label).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "art_info", skip_deserializing)]
    pub label: Field,
    #[serde(rename = "nomor_urut_anggota_keluarga", default, deserialize_with = "loose_text")]
    pub sequence: Field,
    #[serde(rename = "nik", default, deserialize_with = "loose_text")]
    pub national_id: Field,
    #[serde(rename = "nama_anggota_keluarga", default, deserialize_with = "loose_text")]
    pub name: Field,
    #[serde(rename = "keberadaan", default, deserialize_with = "loose_text")]
    pub existence: Field,
    #[serde(rename = "status_hubungan", default, deserialize_with = "loose_text")]
    pub relationship: Field,
    #[serde(rename = "jenis_kelamin", default, deserialize_with = "loose_text")]
    pub sex: Field,
    #[serde(rename = "tanggal_lahir", default, deserialize_with = "loose_text")]
    pub birth_day: Field,
    #[serde(rename = "bulan_lahir", default, deserialize_with = "loose_text")]
    pub birth_month: Field,
    #[serde(rename = "tahun_lahir", default, deserialize_with = "loose_text")]
    pub birth_year: Field,
}

/// A household extraction record with its members.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "WireRecord")]
pub struct HouseholdRecord {
    pub record_id: Option<RecordId>,
    pub status: Field,
    pub extraction_timestamp: Field,
    pub location: Location,
    pub household: Household,
    pub members: Vec<MemberRecord>,
}

impl HouseholdRecord {
    pub fn extraction_status(&self) -> ExtractionStatus {
        ExtractionStatus::from_code(self.status.as_deref())
    }
}

#[derive(Deserialize)]
struct WireRecord {
    #[serde(default, deserialize_with = "record_id")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "loose_text")]
    status: Field,
    #[serde(default, deserialize_with = "loose_text")]
    extraction_timestamp: Field,
    #[serde(default, deserialize_with = "null_default")]
    data: WireData,
}

#[derive(Default, Deserialize)]
struct WireData {
    #[serde(default, deserialize_with = "null_default")]
    page1_blok_i: Location,
    #[serde(default, deserialize_with = "null_default")]
    page2_blok_v: Household,
    #[serde(default, deserialize_with = "null_default")]
    art_details: Vec<WireMember>,
}

#[derive(Default, Deserialize)]
struct WireMember {
    #[serde(default, deserialize_with = "loose_text")]
    art_info: Field,
    #[serde(default, deserialize_with = "null_default")]
    detail_data: MemberRecord,
}

impl From<WireRecord> for HouseholdRecord {
    fn from(wire: WireRecord) -> Self {
        let members = wire
            .data
            .art_details
            .into_iter()
            .map(|entry| MemberRecord {
                label: entry.art_info,
                ..entry.detail_data
            })
            .collect();
        Self {
            record_id: wire.id,
            status: wire.status,
            extraction_timestamp: wire.extraction_timestamp,
            location: wire.data.page1_blok_i,
            household: wire.data.page2_blok_v,
            members,
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One member of one household, with the household's fields copied alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    #[serde(rename = "id")]
    pub record_id: RecordId,
    pub status: Field,
    #[serde(flatten)]
    pub location: Location,
    #[serde(flatten)]
    pub household: Household,
    #[serde(flatten)]
    pub member: MemberRecord,
    /// True when the household had no members and this row stands in for it.
    #[serde(skip)]
    pub placeholder: bool,
}

impl FlatRow {
    pub fn relationship(&self) -> Relationship {
        Relationship::from_code(self.member.relationship.as_deref())
    }

    pub fn presence(&self) -> Presence {
        Presence::from_code(self.member.existence.as_deref())
    }
}

/// A flat row plus computed fields. Absent derived values are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub flat: FlatRow,
    #[serde(rename = "umur")]
    pub age: Option<i64>,
    #[serde(rename = "gaji_uang")]
    pub cash_income: Option<i64>,
    #[serde(rename = "gaji_barang")]
    pub goods_income: Option<i64>,
    #[serde(rename = "hari_kerja")]
    pub work_days: i64,
    #[serde(rename = "jam_kerja")]
    pub work_hours: i64,
    #[serde(rename = "lulus_sd")]
    pub grad_primary: Option<i64>,
    #[serde(rename = "lulus_smp")]
    pub grad_lower_secondary: Option<i64>,
    #[serde(rename = "lulus_sma")]
    pub grad_upper_secondary: Option<i64>,
}
