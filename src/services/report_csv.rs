use csv::WriterBuilder;

use crate::repositories::dashboard::ReportRow;
use crate::services::progress::completion_percent;

const HEADERS: [&str; 10] = [
    "nim",
    "nama",
    "matkul",
    "total_item",
    "selesai",
    "persen",
    "diskusi_selesai",
    "absen_selesai",
    "tugas_selesai",
    "quiz_selesai",
];

/// Renders the per-enrollment progress report as CSV bytes.
pub(crate) fn render_report(rows: &[ReportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record([
            row.nim.as_str(),
            row.student_nama.as_str(),
            row.course_nama.as_str(),
            &row.total.to_string(),
            &row.selesai.to_string(),
            &format!("{:.2}", completion_percent(row.selesai, row.total)),
            &row.diskusi_selesai.to_string(),
            &row.absen_selesai.to_string(),
            &row.tugas_selesai.to_string(),
            &row.quiz_selesai.to_string(),
        ])?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(nim: &str, course: &str, total: i64, selesai: i64) -> ReportRow {
        ReportRow {
            nim: nim.to_string(),
            student_nama: "Budi Santoso".to_string(),
            course_nama: course.to_string(),
            total,
            selesai,
            diskusi_selesai: selesai.min(8),
            absen_selesai: 0,
            tugas_selesai: 0,
            quiz_selesai: 0,
        }
    }

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![row("041234567", "Statistika", 19, 5)];
        let bytes = render_report(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "nim,nama,matkul,total_item,selesai,persen,\
             diskusi_selesai,absen_selesai,tugas_selesai,quiz_selesai"
        );
        let data = lines.next().unwrap();
        assert!(data.starts_with("041234567,Budi Santoso,Statistika,19,5,26.32"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn quotes_fields_with_commas() {
        let rows = vec![row("041234567", "Bahasa, Sastra", 10, 10)];
        let text = String::from_utf8(render_report(&rows).unwrap()).unwrap();
        assert!(text.contains("\"Bahasa, Sastra\""));
    }

    #[test]
    fn empty_report_is_header_only() {
        let text = String::from_utf8(render_report(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
