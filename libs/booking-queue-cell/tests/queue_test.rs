use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use tokio_test::assert_ok;

use booking_queue_cell::*;
use shared_config::TokenPolicy;
use shared_database::records::APPOINTMENTS_KEY;
use shared_database::{KeyValueBackend, MemoryBackend, RecordStore};
use shared_models::{AppointmentStatus, ClinicStatus};
use shared_utils::test_utils::{seeded_state, TestClinic, TestConfig, TEST_CLINIC_ID};

fn patient(name: &str) -> PatientDetails {
    PatientDetails {
        name: name.to_string(),
        mobile: "9000000000".to_string(),
        address: "Ward 4".to_string(),
        date: "2026-10-16".to_string(),
        time: "10:30".to_string(),
    }
}

fn engine(policy: TokenPolicy) -> (QueueEngine, RecordStore) {
    let store = RecordStore::in_memory();
    (QueueEngine::new(store.clone(), policy), store)
}

#[tokio::test]
async fn test_nth_booking_gets_token_n() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    for n in 1..=6u32 {
        let appointment = engine
            .book_appointment(TEST_CLINIC_ID, patient(&format!("P{}", n)))
            .await
            .expect("Booking should succeed");
        assert_eq!(appointment.token, n);
        assert_eq!(appointment.status, AppointmentStatus::Waiting);
        assert_eq!(appointment.clinic_id, TEST_CLINIC_ID);
    }
}

#[tokio::test]
async fn test_booking_persists_immediately_in_order() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);

    let first = engine.book_appointment(TEST_CLINIC_ID, patient("Asha")).await.unwrap();
    let second = engine.book_appointment(TEST_CLINIC_ID, patient("Bala")).await.unwrap();

    let stored = store.get_appointments().await.unwrap();
    assert_eq!(stored, vec![first, second]);
}

#[tokio::test]
async fn test_booking_ids_are_unique() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    let a = engine.book_appointment(TEST_CLINIC_ID, patient("A")).await.unwrap();
    let b = engine.book_appointment(TEST_CLINIC_ID, patient("B")).await.unwrap();

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn test_tokens_are_counted_per_clinic() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    engine.book_appointment(TEST_CLINIC_ID, patient("A")).await.unwrap();
    engine.book_appointment(TEST_CLINIC_ID, patient("B")).await.unwrap();
    let other = engine.book_appointment("clinic_other", patient("C")).await.unwrap();

    assert_eq!(other.token, 1);
}

#[tokio::test]
async fn test_completed_token_can_be_reissued() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    assert_eq!((p1.token, p2.token), (1, 2));

    engine.advance(&p1.id).await.unwrap();
    engine.advance(&p1.id).await.unwrap();

    // One active appointment left, so the next booking gets #2 again.
    let p3 = engine.book_appointment(TEST_CLINIC_ID, patient("P3")).await.unwrap();
    assert_eq!(p3.token, 2);
    assert_eq!(p3.token, p2.token);
    assert_ne!(p3.id, p2.id);
}

#[tokio::test]
async fn test_skipped_appointments_still_count_as_active() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    engine.skip(&p1.id).await.unwrap();

    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    assert_eq!(p2.token, 2);
}

#[tokio::test]
async fn test_monotonic_policy_never_reuses_tokens() {
    let (engine, _) = engine(TokenPolicy::Monotonic);

    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    engine.advance(&p1.id).await.unwrap();
    engine.advance(&p1.id).await.unwrap();
    engine.advance(&p2.id).await.unwrap();
    engine.advance(&p2.id).await.unwrap();

    let p3 = engine.book_appointment(TEST_CLINIC_ID, patient("P3")).await.unwrap();
    assert_eq!(p3.token, 3);
    assert_eq!(engine.policy(), TokenPolicy::Monotonic);
}

#[tokio::test]
async fn test_booking_validation_rejects_blank_fields() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);

    let mut details = patient("   ");
    details.time = String::new();

    let result = engine.book_appointment(TEST_CLINIC_ID, details).await;
    assert_matches!(
        result,
        Err(BookingQueueError::ValidationError(msg)) if msg.contains("name") && msg.contains("time")
    );
    assert!(store.get_appointments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_trims_input_and_allows_blank_address() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    let mut details = patient("  Kavya  ");
    details.address = "  ".to_string();

    let appointment = engine.book_appointment(TEST_CLINIC_ID, details).await.unwrap();
    assert_eq!(appointment.patient_name, "Kavya");
    assert_eq!(appointment.address, "");
}

#[tokio::test]
async fn test_engine_does_not_check_clinic_status() {
    let state = seeded_state(&TestConfig::default(), TestClinic::closed(), false).await;
    let engine = QueueEngine::new(state.store.clone(), TokenPolicy::ActiveCount);

    let appointment = assert_ok!(engine.book_appointment(TEST_CLINIC_ID, patient("Late")).await);
    assert_eq!(appointment.token, 1);
}

#[tokio::test]
async fn test_advance_walks_the_state_machine() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();

    let step1 = engine.advance(&p1.id).await.unwrap();
    assert_eq!(step1.status, AppointmentStatus::Processing);

    let step2 = engine.advance(&p1.id).await.unwrap();
    assert_eq!(step2.status, AppointmentStatus::Completed);

    let stored = store.get_appointments().await.unwrap();
    assert_eq!(stored[0].status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn test_advance_is_idempotent_once_completed() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    engine.advance(&p1.id).await.unwrap();
    let completed = engine.advance(&p1.id).await.unwrap();

    for _ in 0..3 {
        let again = engine.advance(&p1.id).await.unwrap();
        assert_eq!(again.status, AppointmentStatus::Completed);
        assert_eq!(again.token, completed.token);
        assert_eq!(again, completed);
    }
}

#[tokio::test]
async fn test_advance_ignores_token_order() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();

    let advanced = engine.advance(&p2.id).await.unwrap();
    assert_eq!(advanced.status, AppointmentStatus::Processing);

    let untouched = engine.get_appointment(&p1.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, AppointmentStatus::Waiting);
}

#[tokio::test]
async fn test_advance_unknown_id_is_not_found_without_write() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let before = store.get_appointments().await.unwrap();

    let missing = "A1700000000000";
    let result = engine.advance(missing).await;

    assert_matches!(result, Err(BookingQueueError::AppointmentNotFound(id)) if id == missing);
    assert_eq!(store.get_appointments().await.unwrap(), before);
    assert_eq!(before[0].id, p1.id);
}

#[tokio::test]
async fn test_skip_transitions() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();

    let skipped = engine.skip(&p1.id).await.unwrap();
    assert_eq!(skipped.status, AppointmentStatus::Skipped);
    // Skipping again is a no-op.
    assert_eq!(engine.skip(&p1.id).await.unwrap(), skipped);
    // Skipped is terminal for advance too.
    assert_eq!(engine.advance(&p1.id).await.unwrap(), skipped);

    engine.advance(&p2.id).await.unwrap();
    assert_matches!(
        engine.skip(&p2.id).await,
        Err(BookingQueueError::InvalidStatusTransition {
            from: AppointmentStatus::Processing,
            to: AppointmentStatus::Skipped,
        })
    );
}

#[tokio::test]
async fn test_lookup_scenario_after_first_patient_completes() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    let p3 = engine.book_appointment(TEST_CLINIC_ID, patient("P3")).await.unwrap();
    assert_eq!((p1.token, p2.token, p3.token), (1, 2, 3));

    engine.advance(&p1.id).await.unwrap();
    engine.advance(&p1.id).await.unwrap();

    let p2_now = engine.get_appointment(&p2.id).await.unwrap().unwrap();
    let p3_now = engine.get_appointment(&p3.id).await.unwrap().unwrap();
    assert_eq!(p2_now.status, AppointmentStatus::Waiting);
    assert_eq!(p3_now.status, AppointmentStatus::Waiting);

    // Nobody in consultation: the first waiting patient by token is "serving".
    let lookup_p2 = engine.lookup(&p2.id).await.unwrap();
    assert_eq!(lookup_p2.currently_serving_token, 2);
    assert_eq!(lookup_p2.currently_serving_name, "P2");
    assert_eq!(lookup_p2.patients_ahead, 0);

    let lookup_p3 = engine.lookup(&p3.id).await.unwrap();
    assert_eq!(lookup_p3.currently_serving_token, 2);
    assert_eq!(lookup_p3.patients_ahead, 1);
    assert_eq!(lookup_p3.appointment.id, p3.id);
}

#[tokio::test]
async fn test_lookup_prefers_patient_in_consultation() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    let p3 = engine.book_appointment(TEST_CLINIC_ID, patient("P3")).await.unwrap();

    engine.advance(&p2.id).await.unwrap();

    let lookup = engine.lookup(&p3.id).await.unwrap();
    assert_eq!(lookup.currently_serving_token, 2);
    assert_eq!(lookup.currently_serving_name, "P2");
    // Only P1 is still waiting ahead of P3.
    assert_eq!(lookup.patients_ahead, 1);
    assert_eq!(lookup.appointment.token, 3);
    assert_ne!(p1.id, p3.id);
}

#[tokio::test]
async fn test_lookup_falls_back_to_self_when_queue_is_idle() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    engine.advance(&p1.id).await.unwrap();
    engine.advance(&p1.id).await.unwrap();

    let lookup = engine.lookup(&p1.id).await.unwrap();
    assert_eq!(lookup.currently_serving_token, 1);
    assert_eq!(lookup.currently_serving_name, "P1");
    assert_eq!(lookup.patients_ahead, 0);
}

#[tokio::test]
async fn test_lookup_ignores_other_clinics() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);
    engine.book_appointment("clinic_other", patient("Elsewhere")).await.unwrap();
    let mine = engine.book_appointment(TEST_CLINIC_ID, patient("Mine")).await.unwrap();

    let lookup = engine.lookup(&mine.id).await.unwrap();
    assert_eq!(lookup.currently_serving_name, "Mine");
    assert_eq!(lookup.patients_ahead, 0);
}

#[tokio::test]
async fn test_lookup_unknown_id_reports_not_found_and_does_not_mutate() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);
    engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let before = store.get_appointments().await.unwrap();

    let result = engine.lookup("no-such-appointment").await;

    assert_matches!(result, Err(BookingQueueError::AppointmentNotFound(_)));
    assert_eq!(store.get_appointments().await.unwrap(), before);
}

#[tokio::test]
async fn test_closing_clinic_leaves_appointments_untouched() {
    let state = seeded_state(&TestConfig::default(), TestClinic::open(), false).await;
    let engine = QueueEngine::new(state.store.clone(), TokenPolicy::ActiveCount);
    engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    let before = state.store.get_appointments().await.unwrap();

    clinic_cell::ClinicService::new(state.store.clone())
        .set_clinic_status(TEST_CLINIC_ID, ClinicStatus::Closed)
        .await
        .unwrap();

    assert_eq!(state.store.get_appointments().await.unwrap(), before);
}

#[tokio::test]
async fn test_clinic_listing_is_chronological_and_summarised() {
    let (engine, store) = engine(TokenPolicy::ActiveCount);
    let p1 = engine.book_appointment(TEST_CLINIC_ID, patient("P1")).await.unwrap();
    let p2 = engine.book_appointment(TEST_CLINIC_ID, patient("P2")).await.unwrap();
    engine.book_appointment("clinic_other", patient("X")).await.unwrap();

    // Push P2's creation time earlier than P1's.
    let mut stored = store.get_appointments().await.unwrap();
    stored[1].created_at = Utc::now() - Duration::hours(1);
    store.save_appointments(&stored).await.unwrap();

    let listing = engine.appointments_for_clinic(TEST_CLINIC_ID).await.unwrap();
    let ids: Vec<&str> = listing.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec![p2.id.as_str(), p1.id.as_str()]);

    engine.advance(&p1.id).await.unwrap();
    engine.skip(&p2.id).await.unwrap();
    let summary = engine.summary(TEST_CLINIC_ID).await.unwrap();
    assert_eq!(
        summary,
        QueueSummary {
            waiting: 0,
            in_consultation: 1,
            completed: 0,
            skipped: 1,
            total: 2,
        }
    );
}

#[tokio::test]
async fn test_concurrent_bookings_get_distinct_tokens() {
    let (engine, _) = engine(TokenPolicy::ActiveCount);

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .book_appointment(TEST_CLINIC_ID, patient(&format!("P{}", i)))
                .await
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().unwrap().token);
    }
    tokens.sort_unstable();

    assert_eq!(tokens, (1..=10).collect::<Vec<u32>>());
}

#[test]
fn test_next_token_on_empty_collection() {
    assert_eq!(next_token(&[], TEST_CLINIC_ID, TokenPolicy::ActiveCount), 1);
    assert_eq!(next_token(&[], TEST_CLINIC_ID, TokenPolicy::Monotonic), 1);
}

#[tokio::test]
async fn test_existing_browser_bookings_join_the_queue() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .set(
            APPOINTMENTS_KEY,
            format!(
                r#"[{{"id":"A1700000000000","doctorId":"{}","patientName":"Old","mobile":"9000000000","address":"","date":"2023-11-14","time":"10:00","status":"waiting","token":1,"createdAt":1700000000000}}]"#,
                TEST_CLINIC_ID
            ),
        )
        .await
        .unwrap();
    let engine = QueueEngine::new(RecordStore::new(backend), TokenPolicy::ActiveCount);

    let fresh = engine.book_appointment(TEST_CLINIC_ID, patient("New")).await.unwrap();
    assert_eq!(fresh.token, 2);

    let lookup = engine.lookup(&fresh.id).await.unwrap();
    assert_eq!(lookup.currently_serving_name, "Old");
    assert_eq!(lookup.patients_ahead, 1);

    let advanced = engine.advance("A1700000000000").await.unwrap();
    assert_eq!(advanced.status, AppointmentStatus::Processing);
}
