use crate::repositories::dashboard::ProgressRow;
use crate::schemas::dashboard::{CourseProgress, JenisProgress};

pub(crate) fn completion_percent(selesai: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (selesai as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Folds per-(enrollment, jenis) rows into one entry per enrollment. Rows
/// arrive ordered by course, so adjacent rows with the same enrollment id
/// belong together.
pub(crate) fn group_progress(rows: Vec<ProgressRow>) -> Vec<CourseProgress> {
    let mut grouped: Vec<CourseProgress> = Vec::new();

    for row in rows {
        match grouped.last_mut() {
            Some(current) if current.enrollment_id == row.enrollment_id => {
                current.total += row.total;
                current.selesai += row.selesai;
                current.by_jenis.push(JenisProgress {
                    jenis: row.jenis,
                    total: row.total,
                    selesai: row.selesai,
                });
            }
            _ => {
                grouped.push(CourseProgress {
                    enrollment_id: row.enrollment_id,
                    course_id: row.course_id,
                    course_nama: row.course_nama,
                    by_jenis: vec![JenisProgress {
                        jenis: row.jenis,
                        total: row.total,
                        selesai: row.selesai,
                    }],
                    total: row.total,
                    selesai: row.selesai,
                    completion_percent: 0.0,
                });
            }
        }
    }

    for entry in &mut grouped {
        entry.completion_percent = completion_percent(entry.selesai, entry.total);
    }

    grouped
}
