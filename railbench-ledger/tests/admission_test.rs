//! Admission behaviour of the reservation ledger

use railbench_ledger::*;
use std::sync::Arc;

fn request(departure: &str, arrival: &str, car: u32, seats: &[(u32, &str)]) -> ReservationRequest {
    ReservationRequest {
        date: "2020-02-10".to_string(),
        departure: departure.to_string(),
        arrival: arrival.to_string(),
        train_class: "express".to_string(),
        train_name: "7".to_string(),
        car_number: car,
        seat_class: SeatClass::Reserved,
        seats: seats
            .iter()
            .map(|(row, column)| SeatCoordinate::new(*row, *column))
            .collect(),
        adult: seats.len() as u32,
        child: 0,
    }
}

fn owner() -> User {
    User::new("owner@example.com", "pw")
}

async fn ledger_with(existing: ReservationRequest) -> ReservationLedger {
    let ledger = ReservationLedger::new();
    ledger.register(owner(), &existing, 10).await.unwrap();
    ledger
}

#[tokio::test]
async fn test_down_line_admission() {
    let ledger = ledger_with(request("Furuoka", "Arakawa", 1, &[(1, "A")])).await;

    let cases = [
        // same section, same seat
        (request("Furuoka", "Arakawa", 1, &[(1, "A")]), false),
        // different seat
        (request("Furuoka", "Arakawa", 1, &[(9, "E")]), true),
        // different car
        (request("Furuoka", "Arakawa", 2, &[(1, "A")]), true),
        // departure before, arrival inside
        (request("Tokyo", "Isokawa", 1, &[(1, "A")]), false),
        // departure inside, arrival after
        (request("Yamada", "Naruto", 1, &[(1, "A")]), false),
        // covers the whole existing section
        (request("Tokyo", "Osaka", 1, &[(1, "A")]), false),
        // ends where the existing one starts
        (request("Tokyo", "Furuoka", 1, &[(1, "A")]), true),
        // starts where the existing one ends
        (request("Arakawa", "Naruto", 1, &[(1, "A"), (2, "B")]), true),
    ];

    for (idx, (candidate, expected)) in cases.iter().enumerate() {
        assert_eq!(
            ledger.can_admit(candidate).await,
            *expected,
            "case {} ({} -> {})",
            idx,
            candidate.departure,
            candidate.arrival
        );
    }
}

#[tokio::test]
async fn test_up_line_admission() {
    let ledger = ledger_with(request("Arakawa", "Furuoka", 1, &[(1, "A")])).await;

    let cases = [
        (request("Arakawa", "Furuoka", 1, &[(1, "A")]), false),
        (request("Naruto", "Yamada", 1, &[(1, "A")]), false),
        (request("Isokawa", "Tokyo", 1, &[(1, "A")]), false),
        (request("Naruto", "Arakawa", 1, &[(1, "A")]), true),
        (request("Furuoka", "Tokyo", 1, &[(1, "A")]), true),
    ];

    for (idx, (candidate, expected)) in cases.iter().enumerate() {
        assert_eq!(ledger.can_admit(candidate).await, *expected, "case {}", idx);
    }
}

#[tokio::test]
async fn test_opposite_direction_never_conflicts() {
    let ledger = ledger_with(request("Tokyo", "Osaka", 3, &[(1, "A"), (1, "B")])).await;
    let reverse = request("Osaka", "Tokyo", 3, &[(1, "A"), (1, "B")]);
    assert_eq!(ledger.check_admission(&reverse).await, Admission::Admit);
}

#[tokio::test]
async fn test_other_train_or_date_never_conflicts() {
    let ledger = ledger_with(request("Tokyo", "Osaka", 3, &[(1, "A")])).await;

    let mut other_train = request("Tokyo", "Osaka", 3, &[(1, "A")]);
    other_train.train_name = "8".to_string();
    assert!(ledger.can_admit(&other_train).await);

    let mut other_class = request("Tokyo", "Osaka", 3, &[(1, "A")]);
    other_class.train_class = "local".to_string();
    assert!(ledger.can_admit(&other_class).await);

    let mut other_day = request("Tokyo", "Osaka", 3, &[(1, "A")]);
    other_day.date = "2020-02-11".to_string();
    assert!(ledger.can_admit(&other_day).await);

    // same day given as a timestamp
    let mut same_day = request("Tokyo", "Osaka", 3, &[(1, "A")]);
    same_day.date = "2020-02-10T09:30:00+09:00".to_string();
    assert_eq!(ledger.check_admission(&same_day).await, Admission::Conflict(10));
}

#[tokio::test]
async fn test_unknown_station_is_indeterminate() {
    let ledger = ReservationLedger::new();
    let candidate = request("Tokyo", "Nowhere", 1, &[(1, "A")]);
    assert_eq!(ledger.check_admission(&candidate).await, Admission::Indeterminate);
}

#[tokio::test]
async fn test_conflict_found_among_many_records() {
    let ledger = ReservationLedger::new();
    for id in 0..200u64 {
        let row = (id % 20) as u32 + 1;
        let car = (id / 20) as u32 + 3;
        ledger
            .register(owner(), &request("Tokyo", "Kyoto", car, &[(row, "C")]), id)
            .await
            .unwrap();
    }

    let candidate = request("Shirakawa", "Osaka", 5, &[(4, "C")]);
    assert_eq!(ledger.check_admission(&candidate).await, Admission::Conflict(43));
}

#[tokio::test]
async fn test_commit_and_cancel_lifecycle() {
    let ledger = ledger_with(request("Tokyo", "Osaka", 1, &[(1, "A")])).await;

    assert_eq!(ledger.commit(99).await, Err(LedgerError::UnknownReservation(99)));
    assert_eq!(ledger.cancel(99).await, Err(LedgerError::UnknownReservation(99)));

    ledger.commit(10).await.unwrap();
    assert_eq!(ledger.committed_count().await, 1);

    ledger.cancel(10).await.unwrap();
    assert!(!ledger.is_committed(10).await);
    assert!(ledger.is_canceled(10).await);
    assert_eq!(ledger.committed_count().await, 0);
    assert_eq!(ledger.count().await, 1);

    let mut canceled = Vec::new();
    ledger.for_each_canceled(|record| canceled.push(record.id)).await;
    assert_eq!(canceled, vec![10]);

    let mut committed = 0;
    ledger.for_each_committed(|_| committed += 1).await;
    assert_eq!(committed, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_and_writers() {
    let ledger = Arc::new(ReservationLedger::new());

    let mut handles = Vec::new();
    for id in 0..50u64 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            let candidate = request("Tokyo", "Osaka", 3, &[(id as u32 + 1, "D")]);
            assert!(ledger.can_admit(&candidate).await);
            ledger.register(owner(), &candidate, id).await.unwrap();
            ledger.commit(id).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(ledger.count().await, 50);
    assert_eq!(ledger.committed_count().await, 50);
}

#[test]
fn test_amount_charges_children_half() {
    let mut candidate = request("Tokyo", "Furuoka", 4, &[(1, "A"), (1, "B"), (1, "C")]);
    candidate.adult = 2;
    candidate.child = 1;
    let record = ReservationRecord::from_request(owner(), &candidate, 1).unwrap();

    // 2500 × 1 × 1.875 = 4687
    assert_eq!(record.amount(&FareTable::new()).unwrap(), 2 * 4687 + 4687 / 2);
}
