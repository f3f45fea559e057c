//! Integration tests for compare and rewrite against a real database.

use chrono::NaiveDate;
use uuid::Uuid;

use pacer_core::ingest::{ProviderActivity, import_activities};
use pacer_core::planner::{self, TrainingPlanDoc};
use pacer_core::reconcile::{self, CompareOutcome, ProposedWorkout, ReconcileError, Verdict};
use pacer_db::queries::workouts;
use pacer_test_utils::TestDb;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn proposal(day: &str, km: f64) -> ProposedWorkout {
    ProposedWorkout::new(date(day), km)
}

async fn seed_plan(db: &TestDb, user: &str, workouts: Vec<ProposedWorkout>) -> Uuid {
    let doc = TrainingPlanDoc {
        user_id: user.to_string(),
        goal: "test plan".to_string(),
        workouts,
    };
    planner::create_plan(&db.pool, &doc)
        .await
        .expect("create_plan should succeed")
        .plan
        .id
}

fn run(id: i64, sport: &str, start: &str, meters: f64, secs: i64) -> ProviderActivity {
    ProviderActivity {
        id,
        name: Some(format!("{sport} {id}")),
        sport_type: Some(sport.to_string()),
        start_date_local: Some(start.to_string()),
        distance: Some(meters),
        moving_time: Some(secs),
        elapsed_time: Some(secs),
        average_speed: Some(meters / secs as f64),
        ..Default::default()
    }
}

/// `(date, km)` pairs for a plan, in date order.
async fn schedule(db: &TestDb, plan_id: Uuid) -> Vec<(NaiveDate, f64)> {
    workouts::list_workouts_for_plan(&db.pool, plan_id)
        .await
        .unwrap()
        .into_iter()
        .map(|w| (w.scheduled_date, w.distance_km))
        .collect()
}

// -----------------------------------------------------------------------
// Compare
// -----------------------------------------------------------------------

#[tokio::test]
async fn compare_five_planned_two_run_is_missed() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(&db, "user_123", vec![proposal("2026-01-01", 5.0)]).await;

    let summary = import_activities(
        &db.pool,
        "user_123",
        vec![run(1, "Run", "2026-01-01T07:00:00Z", 2000.0, 700)],
    )
    .await;
    assert_eq!(summary.upserted, 1);

    let outcome = reconcile::compare(&db.pool, "user_123", date("2026-01-01"))
        .await
        .unwrap();
    let report = outcome.report().expect("a workout was scheduled");
    assert_eq!(report.plan_id, plan_id);
    assert_eq!(report.planned_km, 5.0);
    assert_eq!(report.actual_km, 2.0);
    assert_eq!(report.compliance_percent, 40.0);
    assert_eq!(report.verdict, Verdict::Missed);

    db.teardown().await;
}

#[tokio::test]
async fn compare_unscheduled_day() {
    let db = TestDb::new().await;
    seed_plan(&db, "user_123", vec![proposal("2026-01-01", 5.0)]).await;
    import_activities(
        &db.pool,
        "user_123",
        vec![run(1, "Run", "2026-01-02T07:00:00Z", 8000.0, 2400)],
    )
    .await;

    let outcome = reconcile::compare(&db.pool, "user_123", date("2026-01-02"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CompareOutcome::NotScheduled {
            date: date("2026-01-02")
        }
    );

    // Another user's plan is not this user's schedule.
    let outcome = reconcile::compare(&db.pool, "someone_else", date("2026-01-01"))
        .await
        .unwrap();
    assert!(outcome.report().is_none());

    db.teardown().await;
}

#[tokio::test]
async fn compare_with_no_runs_is_zero() {
    let db = TestDb::new().await;
    seed_plan(&db, "u", vec![proposal("2026-01-01", 5.0)]).await;

    let outcome = reconcile::compare(&db.pool, "u", date("2026-01-01")).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.actual_km, 0.0);
    assert_eq!(report.compliance_percent, 0.0);
    assert_eq!(report.verdict, Verdict::Missed);
    assert_eq!(report.avg_speed_mps, None);

    db.teardown().await;
}

#[tokio::test]
async fn compare_zero_planned_distance_does_not_fault() {
    let db = TestDb::new().await;
    seed_plan(&db, "u", vec![proposal("2026-01-01", 0.0)]).await;
    import_activities(&db.pool, "u", vec![run(1, "Run", "2026-01-01T07:00:00Z", 3000.0, 900)]).await;

    let outcome = reconcile::compare(&db.pool, "u", date("2026-01-01")).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.compliance_percent, 0.0);
    assert_eq!(report.actual_km, 3.0);
    assert_eq!(report.verdict, Verdict::Missed);

    db.teardown().await;
}

#[tokio::test]
async fn compare_exactly_half_is_good() {
    let db = TestDb::new().await;
    seed_plan(&db, "u", vec![proposal("2026-01-01", 10.0)]).await;
    import_activities(&db.pool, "u", vec![run(1, "Run", "2026-01-01T07:00:00Z", 5000.0, 1500)]).await;

    let outcome = reconcile::compare(&db.pool, "u", date("2026-01-01")).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.compliance_percent, 50.0);
    assert_eq!(report.verdict, Verdict::Good);

    db.teardown().await;
}

#[tokio::test]
async fn compare_counts_only_runs_and_sums_them() {
    let db = TestDb::new().await;
    seed_plan(&db, "u", vec![proposal("2026-01-01", 10.0)]).await;
    import_activities(
        &db.pool,
        "u",
        vec![
            run(1, "TrailRun", "2026-01-01T07:00:00Z", 4000.0, 1600),
            run(2, "VirtualRun", "2026-01-01T19:00:00Z", 5000.0, 1500),
            run(3, "Ride", "2026-01-01T12:00:00Z", 30000.0, 3600),
            run(4, "Run", "2026-01-02T00:10:00Z", 6000.0, 1800),
        ],
    )
    .await;

    let outcome = reconcile::compare(&db.pool, "u", date("2026-01-01")).await.unwrap();
    let report = outcome.report().unwrap();
    assert_eq!(report.actual_km, 9.0);
    assert_eq!(report.compliance_percent, 90.0);
    assert_eq!(report.verdict, Verdict::Good);
    assert!(report.avg_speed_mps.is_some());

    db.teardown().await;
}

#[tokio::test]
async fn compare_blank_user_is_invalid() {
    let db = TestDb::new().await;
    let err = reconcile::compare(&db.pool, "  ", date("2026-01-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    db.teardown().await;
}

// -----------------------------------------------------------------------
// Rewrite
// -----------------------------------------------------------------------

#[tokio::test]
async fn rewrite_replaces_tail_from_cutoff() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(
        &db,
        "u",
        vec![proposal("2026-01-01", 5.0), proposal("2026-01-03", 10.0)],
    )
    .await;

    let result = reconcile::rewrite(
        &db.pool,
        plan_id,
        &[proposal("2026-01-04", 8.0), proposal("2026-01-02", 3.0)],
    )
    .await
    .unwrap();

    assert_eq!(result.plan_id, plan_id);
    assert_eq!(result.cutoff, date("2026-01-02"));
    assert_eq!(result.deleted, 1);
    assert_eq!(result.inserted, 2);

    assert_eq!(
        schedule(&db, plan_id).await,
        vec![
            (date("2026-01-01"), 5.0),
            (date("2026-01-02"), 3.0),
            (date("2026-01-04"), 8.0),
        ]
    );

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_stamps_owner_and_defaults() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(&db, "owner", vec![proposal("2026-01-01", 5.0)]).await;

    reconcile::rewrite(
        &db.pool,
        plan_id,
        &[proposal("2026-01-05", 6.0), proposal("2026-01-06", 12.0).with_type("Long Run")],
    )
    .await
    .unwrap();

    let rows = workouts::list_workouts_for_plan(&db.pool, plan_id).await.unwrap();
    assert!(rows.iter().all(|w| w.user_id == "owner"));
    assert_eq!(rows[1].workout_type, "Run");
    assert_eq!(rows[2].workout_type, "Long Run");

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_is_idempotent() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(
        &db,
        "u",
        vec![proposal("2026-01-01", 5.0), proposal("2026-01-03", 10.0)],
    )
    .await;
    let batch = [proposal("2026-01-02", 3.0), proposal("2026-01-04", 8.0)];

    reconcile::rewrite(&db.pool, plan_id, &batch).await.unwrap();
    let once = schedule(&db, plan_id).await;

    let second = reconcile::rewrite(&db.pool, plan_id, &batch).await.unwrap();
    assert_eq!(second.deleted, 2);
    assert_eq!(second.inserted, 2);
    assert_eq!(schedule(&db, plan_id).await, once);

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_leaves_earlier_workouts_and_other_plans_alone() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(
        &db,
        "u",
        vec![
            proposal("2026-01-01", 5.0),
            proposal("2026-01-02", 6.0),
            proposal("2026-01-10", 10.0),
        ],
    )
    .await;
    let other = seed_plan(&db, "u", vec![proposal("2026-01-10", 7.0)]).await;

    reconcile::rewrite(&db.pool, plan_id, &[proposal("2026-01-05", 4.0)])
        .await
        .unwrap();

    assert_eq!(
        schedule(&db, plan_id).await,
        vec![
            (date("2026-01-01"), 5.0),
            (date("2026-01-02"), 6.0),
            (date("2026-01-05"), 4.0),
        ]
    );
    assert_eq!(schedule(&db, other).await, vec![(date("2026-01-10"), 7.0)]);

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_failure_midway_rolls_back() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(
        &db,
        "u",
        vec![proposal("2026-01-01", 5.0), proposal("2026-01-03", 10.0)],
    )
    .await;
    let before = schedule(&db, plan_id).await;

    // The trigger rejects the second row after the delete and the first
    // insert have run.
    sqlx::query(
        "CREATE FUNCTION reject_marked_workout() RETURNS trigger LANGUAGE plpgsql AS $$
         BEGIN
             IF NEW.description = 'reject me' THEN
                 RAISE EXCEPTION 'marked workout rejected';
             END IF;
             RETURN NEW;
         END $$",
    )
    .execute(&db.pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_marked_workout BEFORE INSERT ON workouts \
         FOR EACH ROW EXECUTE FUNCTION reject_marked_workout()",
    )
    .execute(&db.pool)
    .await
    .unwrap();

    let batch = [
        proposal("2026-01-02", 3.0),
        ProposedWorkout {
            description: Some("reject me".to_string()),
            ..proposal("2026-01-04", 8.0)
        },
        proposal("2026-01-05", 9.0),
    ];
    let err = reconcile::rewrite(&db.pool, plan_id, &batch).await.unwrap_err();
    assert!(matches!(err, ReconcileError::Store(_)), "got {err:?}");

    assert_eq!(schedule(&db, plan_id).await, before);

    db.teardown().await;
}

#[tokio::test]
async fn long_workout_labels_are_stored_as_given() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(&db, "u", vec![proposal("2026-01-01", 5.0)]).await;

    let label = "Progressive long run with 3x2km at half-marathon effort and strides";
    assert!(label.len() > 64);

    let result = reconcile::rewrite(
        &db.pool,
        plan_id,
        &[proposal("2026-01-02", 14.0).with_type(label)],
    )
    .await
    .unwrap();
    assert_eq!(result.inserted, 1);

    let rows = workouts::list_workouts_for_plan(&db.pool, plan_id).await.unwrap();
    assert_eq!(rows[1].workout_type, label);

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_unknown_plan_is_not_found() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(&db, "u", vec![proposal("2026-01-01", 5.0)]).await;

    let missing = Uuid::new_v4();
    let err = reconcile::rewrite(&db.pool, missing, &[proposal("2026-01-01", 3.0)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), format!("plan {missing} not found"));

    assert_eq!(schedule(&db, plan_id).await, vec![(date("2026-01-01"), 5.0)]);
    assert!(schedule(&db, missing).await.is_empty());

    db.teardown().await;
}

#[tokio::test]
async fn rewrite_rejects_bad_batches_without_touching_the_plan() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(&db, "u", vec![proposal("2026-01-01", 5.0)]).await;

    let err = reconcile::rewrite(&db.pool, plan_id, &[]).await.unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));

    let err = reconcile::rewrite(&db.pool, plan_id, &[proposal("2026-01-01", -1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));

    let err = reconcile::rewrite(&db.pool, plan_id, &[proposal("2026-01-01", f64::NAN)])
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidInput(_)));

    assert_eq!(schedule(&db, plan_id).await, vec![(date("2026-01-01"), 5.0)]);

    db.teardown().await;
}

#[tokio::test]
async fn concurrent_rewrites_of_one_plan_do_not_interleave() {
    let db = TestDb::new().await;
    let plan_id = seed_plan(
        &db,
        "u",
        vec![proposal("2026-01-01", 5.0), proposal("2026-01-03", 10.0)],
    )
    .await;

    let a = [proposal("2026-01-02", 3.0), proposal("2026-01-04", 8.0)];
    let b = [
        proposal("2026-01-02", 4.0),
        proposal("2026-01-05", 9.0),
        proposal("2026-01-06", 11.0),
    ];

    let (ra, rb) = tokio::join!(
        reconcile::rewrite(&db.pool, plan_id, &a),
        reconcile::rewrite(&db.pool, plan_id, &b),
    );
    ra.unwrap();
    rb.unwrap();

    let kept = (date("2026-01-01"), 5.0);
    let as_a = vec![kept, (date("2026-01-02"), 3.0), (date("2026-01-04"), 8.0)];
    let as_b = vec![
        kept,
        (date("2026-01-02"), 4.0),
        (date("2026-01-05"), 9.0),
        (date("2026-01-06"), 11.0),
    ];
    let got = schedule(&db, plan_id).await;
    assert!(got == as_a || got == as_b, "interleaved result: {got:?}");

    db.teardown().await;
}
