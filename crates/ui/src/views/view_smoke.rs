use training_core::model::{Assignee, AssignmentDraft, LessonDraft, LessonKind, ProgressKey, UserId};
use training_core::progress::{ProgressTracker, ProgressUnit};
use dioxus::prelude::ReadableExt;

use super::test_harness::{
    FORMATION, SECTION, USER, ViewKind, mount, seed_document, seed_lesson, seed_quiz,
    test_services,
};
use crate::vm::{QuizIntent, ViewerIntent};

#[tokio::test(flavor = "current_thread")]
async fn home_view_counts_completed_lessons() {
    let services = test_services();
    let done = seed_document(&services, "Handbook", 4).await;
    seed_document(&services, "Appendix", 2).await;

    let mut tracker = ProgressTracker::new(4.0, ProgressUnit::Page).unwrap();
    tracker.set_position(4.0).unwrap();
    services
        .progress()
        .record_snapshot(ProgressKey::new(done.id(), FORMATION, USER), &tracker)
        .await
        .unwrap();

    let mut harness = mount(ViewKind::Home, services);
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("Lessons completed: 1 of 2"),
        "missing completed count in {html}"
    );
    assert!(html.contains("In progress: 0"), "missing in-progress count in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lessons_view_lists_in_position_order() {
    let services = test_services();
    for title in ["Welcome", "Fire safety", "First aid"] {
        seed_lesson(
            &services,
            LessonDraft::new(SECTION, title, LessonKind::Video).with_duration(3),
        )
        .await;
    }
    services.lessons().reorder(SECTION, 2, 0).await.unwrap();

    let mut harness = mount(ViewKind::Lessons, services);
    harness.settle().await;
    let html = harness.render();
    let first_aid = html.find("First aid").expect("first aid listed");
    let welcome = html.find("Welcome").expect("welcome listed");
    let fire = html.find("Fire safety").expect("fire safety listed");
    assert!(first_aid < welcome && welcome < fire, "wrong order in {html}");
    assert!(html.contains("3 min"), "missing duration in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lessons_view_shows_empty_section() {
    let mut harness = mount(ViewKind::Lessons, test_services());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No lessons in this section yet."), "{html}");
    assert!(html.contains("Add lesson"), "missing form in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_viewer_tracks_pages_and_persists_progress() {
    let services = test_services();
    let lesson = seed_document(&services, "Handbook", 4).await;
    let key = ProgressKey::new(lesson.id(), FORMATION, USER);

    let mut harness = mount(ViewKind::Lesson(lesson.id().value()), services.clone());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Handbook"), "missing title in {html}");
    assert!(html.contains("Page 1 of 4"), "missing position in {html}");
    assert!(!html.contains("placeholder-note"), "unexpected placeholder in {html}");

    let dispatch = harness.viewer_handles.dispatch();
    for _ in 0..3 {
        harness.dom.in_runtime(|| dispatch.call(ViewerIntent::NextUnit));
    }
    for _ in 0..10 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("Page 4 of 4"), "missing final page in {html}");
    assert!(html.contains("Progress: 100%"), "missing progress in {html}");

    let record = services
        .progress()
        .load(key)
        .await
        .unwrap()
        .expect("progress persisted by the ticker");
    assert!(record.is_completed());
    assert_eq!(record.markers().page, Some(4));
    assert!(record.time_spent_secs() >= 1);
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_viewer_flags_placeholder_and_opens_content() {
    let services = test_services();
    let lesson = seed_lesson(
        &services,
        LessonDraft::new(SECTION, "Orientation deck", LessonKind::Presentation)
            .with_file("orientation.pptx"),
    )
    .await;

    let mut harness = mount(ViewKind::Lesson(lesson.id().value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Slide 1 of 10"), "missing placeholder total in {html}");
    assert!(
        html.contains("Slide count unknown, progress is estimated."),
        "missing placeholder note in {html}"
    );
    assert!(html.contains("Open content"), "missing open button in {html}");
    assert!(harness.opener.opened().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_viewer_follows_reported_video_position() {
    let services = test_services();
    let lesson = seed_lesson(
        &services,
        LessonDraft::new(SECTION, "Welcome video", LessonKind::Video).with_duration(2),
    )
    .await;

    let mut harness = mount(ViewKind::Lesson(lesson.id().value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Video plays outside the app."), "missing note in {html}");
    assert!(html.contains("viewer-seek"), "missing seek slider in {html}");
    assert!(html.contains("0:00 / 2:00"), "missing position in {html}");

    let dispatch = harness.viewer_handles.dispatch();
    harness
        .dom
        .in_runtime(|| dispatch.call(ViewerIntent::Seek(60.0)));
    for _ in 0..3 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("1:00 / 2:00"), "missing seek position in {html}");
    assert!(html.contains("Progress: 50%"), "missing progress in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_viewer_reports_missing_lesson() {
    let mut harness = mount(ViewKind::Lesson(404), test_services());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("This lesson no longer exists."), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_scores_and_restarts() {
    let services = test_services();
    let lesson = seed_document(&services, "Handbook", 4).await;
    seed_quiz(&services, lesson.id()).await;

    let mut harness = mount(ViewKind::Quiz(lesson.id().value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Checkpoint"), "missing quiz title in {html}");
    assert!(html.contains("Question 1 of 2"), "missing counter in {html}");
    assert!(html.contains("Passing score: 80%"), "missing passing score in {html}");

    let dispatch = harness.quiz_handles.dispatch();
    for intent in [
        QuizIntent::Select(0),
        QuizIntent::Next,
        QuizIntent::Select(1),
        QuizIntent::Submit,
    ] {
        harness.dom.in_runtime(|| dispatch.call(intent));
    }
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Not passed: 50%"), "missing score in {html}");
    assert!(html.contains("1 of 2 correct"), "missing detail in {html}");

    let vm = harness.quiz_handles.vm();
    let score = harness
        .dom
        .in_runtime(|| vm.peek().as_ref().and_then(|vm| vm.preview().score()))
        .expect("submitted");
    assert_eq!(score.percentage, 50);
    assert!(!score.passed);

    harness.dom.in_runtime(|| dispatch.call(QuizIntent::Restart));
    harness.drive_async().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 2"), "restart did not reset in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_without_quiz() {
    let services = test_services();
    let lesson = seed_document(&services, "Handbook", 4).await;
    let mut harness = mount(ViewKind::Quiz(lesson.id().value()), services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("This lesson has no quiz yet."), "{html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assign_view_lists_current_assignments() {
    let services = test_services();
    let mut draft = AssignmentDraft::new(FORMATION);
    draft.users = vec![USER, UserId::new(3)];
    services.assignments().assign(draft).await.unwrap();

    let stored = services.assignments().list(FORMATION).await.unwrap();
    assert!(matches!(stored[0].assignee, Assignee::User(_)));

    let mut harness = mount(ViewKind::Assign, services);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("User 1"), "missing user 1 in {html}");
    assert!(html.contains("User 3"), "missing user 3 in {html}");
    assert!(html.contains("Collaborators"), "missing form in {html}");
}
