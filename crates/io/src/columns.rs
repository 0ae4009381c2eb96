// Export column layout shared by the CSV and XLSX writers

use supas_census::model::Field;
use supas_census::DerivedRow;

/// Header names, in output order. The raw field keys double as display names.
pub const EXPORT_COLUMNS: [&str; 27] = [
    "provinsi",
    "kecamatan",
    "desa_kelurahan",
    "nks",
    "nama_kepala_keluarga",
    "keberadaan_keluarga",
    "alamat_tempat_tinggal",
    "nomor_kartu_keluarga",
    "jumlah_anggota_keluarga",
    "art_info",
    "nomor_urut_anggota_keluarga",
    "nik",
    "nama_anggota_keluarga",
    "keberadaan",
    "status_hubungan",
    "jenis_kelamin",
    "tanggal_lahir",
    "bulan_lahir",
    "tahun_lahir",
    "umur",
    "gaji_uang",
    "gaji_barang",
    "hari_kerja",
    "jam_kerja",
    "lulus_sd",
    "lulus_smp",
    "lulus_sma",
];

/// One output cell. Source text stays text; derived numbers stay numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(i64),
    Empty,
}

impl Cell<'_> {
    /// Plain-text rendering, as written to CSV.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => (*s).to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Display length in characters, used for column auto-fit.
    pub fn width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(n) => n.to_string().len(),
            Cell::Empty => 0,
        }
    }
}

fn text(field: &Field) -> Cell<'_> {
    match field.as_deref() {
        Some(s) => Cell::Text(s),
        None => Cell::Empty,
    }
}

fn number(value: Option<i64>) -> Cell<'static> {
    value.map_or(Cell::Empty, Cell::Number)
}

/// The cells of one row, aligned with [`EXPORT_COLUMNS`].
pub fn cells(row: &DerivedRow) -> [Cell<'_>; 27] {
    let flat = &row.flat;
    let location = &flat.location;
    let household = &flat.household;
    let member = &flat.member;
    [
        text(&location.region),
        text(&location.sub_region),
        text(&location.sub_district),
        text(&location.cluster_code),
        text(&household.head_name),
        text(&household.existence),
        text(&household.address),
        text(&household.family_card_number),
        text(&household.member_count),
        text(&member.label),
        text(&member.sequence),
        text(&member.national_id),
        text(&member.name),
        text(&member.existence),
        text(&member.relationship),
        text(&member.sex),
        text(&member.birth_day),
        text(&member.birth_month),
        text(&member.birth_year),
        number(row.age),
        number(row.cash_income),
        number(row.goods_income),
        Cell::Number(row.work_days),
        Cell::Number(row.work_hours),
        number(row.grad_primary),
        number(row.grad_lower_secondary),
        number(row.grad_upper_secondary),
    ]
}
