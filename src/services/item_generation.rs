use crate::db::types::ItemKind;

/// Sessions that carry a mandatory assignment.
pub(crate) const TUGAS_SESSIONS: [i16; 3] = [3, 5, 7];

/// Number of discussion and attendance sessions per course.
pub(crate) const SESSION_COUNT: i16 = 8;

/// The full set of items a new enrollment starts with: eight discussions,
/// eight attendances, assignments at sessions 3/5/7 and any quiz sessions
/// the student declared. Quiz duplicates are dropped, order is stable.
pub(crate) fn generation_plan(quiz_sesi: &[i16]) -> Vec<(ItemKind, i16)> {
    let mut plan = Vec::with_capacity(19 + quiz_sesi.len());

    for sesi in 1..=SESSION_COUNT {
        plan.push((ItemKind::Diskusi, sesi));
    }
    for sesi in 1..=SESSION_COUNT {
        plan.push((ItemKind::Absen, sesi));
    }
    for sesi in TUGAS_SESSIONS {
        plan.push((ItemKind::Tugas, sesi));
    }

    let mut quiz: Vec<i16> = quiz_sesi.to_vec();
    quiz.sort_unstable();
    quiz.dedup();
    for sesi in quiz {
        plan.push((ItemKind::Quiz, sesi));
    }

    plan
}
