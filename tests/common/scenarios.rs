//! Behaviour every `LedgerStore` must show, run against each implementation.

use anyhow::Result;
use daybook::application::{AppError, LedgerService};
use daybook::domain::{
    MAX_AMOUNT_CENTS, NewTransaction, TransactionInput, TransactionType, ValidationError,
};
use daybook::storage::LedgerStore;

use super::{record, ts, user};

pub async fn ids_strictly_increase<S: LedgerStore>(service: &LedgerService<S>) -> Result<()> {
    let mut last = 0;
    for (i, datetime) in [
        "2024-03-01T00:00:00",
        "2024-01-01T00:00:00",
        "2024-02-01T00:00:00",
    ]
    .iter()
    .enumerate()
    {
        let id = record(service, TransactionType::Credit, 100, "tx", 1 + i as i64, datetime).await?;
        assert!(id > last, "id {} not greater than {}", id, last);
        last = id;
    }
    Ok(())
}

pub async fn unknown_user_has_zero_balance<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    record(service, TransactionType::Credit, 5000, "deposit", 1, "2024-01-01T10:00:00").await?;

    assert_eq!(service.balance_as_of(user(42), ts("2030-01-01T00:00:00")).await?, 0);
    assert!(service
        .list_in_range(user(42), ts("2000-01-01T00:00:00"), ts("2030-01-01T00:00:00"))
        .await?
        .is_empty());
    Ok(())
}

pub async fn balance_follows_cutoff<S: LedgerStore>(service: &LedgerService<S>) -> Result<()> {
    record(service, TransactionType::Credit, 10000, "salary", 1, "2024-02-01T09:00:00").await?;
    record(service, TransactionType::Debit, 4000, "rent", 1, "2024-02-03T18:30:00").await?;

    assert_eq!(service.balance_as_of(user(1), ts("2024-02-01T08:59:59")).await?, 0);
    assert_eq!(service.balance_as_of(user(1), ts("2024-02-01T09:00:00")).await?, 10000);
    assert_eq!(service.balance_as_of(user(1), ts("2024-02-03T18:30:00")).await?, 6000);
    Ok(())
}

pub async fn deposit_and_withdrawal_scenario<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    let deposit =
        record(service, TransactionType::Credit, 5000, "deposit", 1, "2024-01-01T10:00:00").await?;
    let withdrawal =
        record(service, TransactionType::Debit, 2000, "withdrawal", 1, "2024-01-05T12:00:00")
            .await?;

    let listed = service
        .list_in_range(user(1), ts("2024-01-01T00:00:00"), ts("2024-01-05T23:59:59"))
        .await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, deposit);
    assert_eq!(listed[0].transaction_type, TransactionType::Credit);
    assert_eq!(listed[0].amount_cents, 5000);
    assert_eq!(listed[0].description, "deposit");
    assert_eq!(listed[0].user_id, user(1));
    assert_eq!(listed[0].datetime, ts("2024-01-01T10:00:00"));
    assert_eq!(listed[1].id, withdrawal);
    assert_eq!(listed[1].transaction_type, TransactionType::Debit);

    assert_eq!(service.balance_as_of(user(1), ts("2024-01-03T23:59:59")).await?, 5000);
    assert_eq!(service.balance_as_of(user(1), ts("2024-01-05T23:59:59")).await?, 3000);
    Ok(())
}

pub async fn range_bounds_are_inclusive<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    record(service, TransactionType::Credit, 100, "before", 1, "2024-01-09T23:59:59").await?;
    let first = record(service, TransactionType::Credit, 100, "start", 1, "2024-01-10T00:00:00").await?;
    let last = record(service, TransactionType::Debit, 100, "end", 1, "2024-01-12T23:59:59").await?;
    record(service, TransactionType::Credit, 100, "after", 1, "2024-01-13T00:00:00").await?;

    let listed = service
        .list_in_range(user(1), ts("2024-01-10T00:00:00"), ts("2024-01-12T23:59:59"))
        .await?;
    let ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first, last]);

    // Single-instant window
    let listed = service
        .list_in_range(user(1), ts("2024-01-10T00:00:00"), ts("2024-01-10T00:00:00"))
        .await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "start");
    Ok(())
}

pub async fn listing_is_chronological_with_id_tiebreak<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    let late = record(service, TransactionType::Credit, 100, "late", 1, "2024-05-02T08:00:00").await?;
    let tie_a = record(service, TransactionType::Debit, 200, "tie a", 1, "2024-05-01T08:00:00").await?;
    let tie_b = record(service, TransactionType::Credit, 300, "tie b", 1, "2024-05-01T08:00:00").await?;

    let listed = service
        .list_in_range(user(1), ts("2024-05-01T00:00:00"), ts("2024-05-31T23:59:59"))
        .await?;
    let ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![tie_a, tie_b, late]);
    Ok(())
}

pub async fn reads_are_repeatable<S: LedgerStore>(service: &LedgerService<S>) -> Result<()> {
    record(service, TransactionType::Credit, 1234, "a", 1, "2024-01-01T10:00:00").await?;
    record(service, TransactionType::Debit, 234, "b", 1, "2024-01-02T10:00:00").await?;

    let cutoff = ts("2024-01-31T23:59:59");
    assert_eq!(
        service.balance_as_of(user(1), cutoff).await?,
        service.balance_as_of(user(1), cutoff).await?
    );

    let (start, end) = (ts("2024-01-01T00:00:00"), ts("2024-01-31T23:59:59"));
    let first = service.list_in_range(user(1), start, end).await?;
    let second = service.list_in_range(user(1), start, end).await?;
    assert_eq!(first, second);
    Ok(())
}

pub async fn users_are_isolated<S: LedgerStore>(service: &LedgerService<S>) -> Result<()> {
    record(service, TransactionType::Credit, 5000, "mine", 1, "2024-01-01T10:00:00").await?;
    record(service, TransactionType::Credit, 70000, "theirs", 2, "2024-01-01T10:00:00").await?;
    record(service, TransactionType::Debit, 100, "theirs too", 2, "2024-01-02T10:00:00").await?;

    let listed = service
        .list_in_range(user(1), ts("2024-01-01T00:00:00"), ts("2024-12-31T23:59:59"))
        .await?;
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|t| t.user_id == user(1)));

    assert_eq!(service.balance_as_of(user(1), ts("2024-12-31T23:59:59")).await?, 5000);
    assert_eq!(service.balance_as_of(user(2), ts("2024-12-31T23:59:59")).await?, 69900);
    Ok(())
}

pub async fn small_amounts_sum_exactly<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    for _ in 0..10 {
        record(service, TransactionType::Credit, 10, "dime", 1, "2024-01-01T10:00:00").await?;
    }
    record(service, TransactionType::Debit, 30, "three dimes", 1, "2024-01-01T11:00:00").await?;

    assert_eq!(service.balance_as_of(user(1), ts("2024-01-01T23:59:59")).await?, 70);
    Ok(())
}

pub async fn inverted_range_is_rejected<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    let err = service
        .list_in_range(user(1), ts("2024-01-05T00:00:00"), ts("2024-01-01T00:00:00"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::OutOfDomain { field: "start", .. })
    ));
    Ok(())
}

pub async fn raw_input_is_validated_before_storage<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    let input = TransactionInput {
        transaction_type: Some("refund".into()),
        amount: Some("10".into()),
        description: Some("bad type".into()),
        user_id: Some("1".into()),
        datetime: Some("2024-01-01T10:00".into()),
    };
    let err = service.record_input(&input).await.unwrap_err();
    assert!(err.is_validation());

    let input = TransactionInput {
        transaction_type: Some("debit".into()),
        amount: Some("12.50".into()),
        description: Some("lunch".into()),
        user_id: Some("1".into()),
        datetime: Some("2024-01-01T12:30".into()),
    };
    let recorded = service.record_input(&input).await?;
    assert_eq!(recorded.amount_cents, 1250);
    assert_eq!(recorded.datetime, ts("2024-01-01T12:30:00"));

    // Only the valid input reached the store
    let listed = service
        .list_in_range(user(1), ts("2024-01-01T00:00:00"), ts("2024-01-01T23:59:59"))
        .await?;
    assert_eq!(listed, vec![recorded]);
    assert_eq!(service.balance_as_of(user(1), ts("2024-01-01T23:59:59")).await?, -1250);
    Ok(())
}

pub async fn largest_amounts_round_trip_exactly<S: LedgerStore>(
    service: &LedgerService<S>,
) -> Result<()> {
    record(service, TransactionType::Credit, MAX_AMOUNT_CENTS, "max", 1, "2024-01-01T10:00:00").await?;
    record(service, TransactionType::Debit, MAX_AMOUNT_CENTS - 1, "almost max", 1, "2024-01-02T10:00:00").await?;

    let listed = service
        .list_in_range(user(1), ts("2024-01-01T00:00:00"), ts("2024-01-02T23:59:59"))
        .await?;
    assert_eq!(listed[0].amount_cents, MAX_AMOUNT_CENTS);
    assert_eq!(listed[1].amount_cents, MAX_AMOUNT_CENTS - 1);
    assert_eq!(service.balance_as_of(user(1), ts("2024-01-02T23:59:59")).await?, 1);

    let too_large = NewTransaction::credit(
        MAX_AMOUNT_CENTS + 1,
        "too large",
        user(1),
        ts("2024-01-03T10:00:00"),
    );
    assert!(matches!(
        too_large,
        Err(ValidationError::OutOfDomain { field: "amount", .. })
    ));
    Ok(())
}
