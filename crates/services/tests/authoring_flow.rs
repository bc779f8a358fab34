use services::{AppServices, Clock};
use training_core::model::{
    Answer, FormationId, LessonDraft, LessonKind, LessonMetadata, Question, Quiz, QuizId,
    QuizSettings, SectionId, UserId,
};
use training_core::progress::TotalSource;
use training_core::time::fixed_now;

#[tokio::test]
async fn author_reorder_view_and_take_quiz() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_authoring_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
    )
    .await
    .expect("connect sqlite");
    let lessons = services.lessons();
    let section = SectionId::new(1);

    let intro = lessons
        .create_lesson(
            LessonDraft::new(section, "Intro", LessonKind::Video).with_duration(2),
        )
        .await
        .expect("create intro");
    let deck = lessons
        .create_lesson(
            LessonDraft::new(section, "Deck", LessonKind::Presentation).with_metadata(
                LessonMetadata::url("https://cdn.example.com/deck.pptx")
                    .unwrap()
                    .with_slides(4)
                    .unwrap(),
            ),
        )
        .await
        .expect("create deck");

    let reordered = lessons.reorder(section, 1, 0).await.expect("reorder");
    assert_eq!(reordered[0].id(), deck.id());
    let stored = lessons.list_lessons(section).await.expect("list");
    let order: Vec<_> = stored.iter().map(|l| (l.id(), l.position())).collect();
    assert_eq!(order, vec![(deck.id(), 0), (intro.id(), 1)]);

    let progress = services.progress();
    let mut opened = progress
        .open_lesson(&stored[0], FormationId::new(1), UserId::new(9), None)
        .await
        .expect("open lesson");
    assert_eq!(opened.total.source, TotalSource::Content);
    opened.tracker.start();
    opened.tracker.set_position(4.0).unwrap();
    opened.tracker.tick();
    let record = progress
        .record_snapshot(opened.key, &opened.tracker)
        .await
        .expect("record");
    assert!(record.is_completed());
    assert_eq!(record.markers().slide, Some(4));

    let quiz = Quiz::new(
        QuizId::new(1),
        Some(deck.id()),
        "Deck check",
        "",
        QuizSettings::default(),
        vec![
            Question::multiple_choice(
                "First",
                1,
                0,
                vec![Answer::new("yes", true, 0), Answer::new("no", false, 1)],
            ),
            Question::free_text("Explain", 1, 1),
        ],
    )
    .unwrap();
    let quizzes = services.quizzes();
    quizzes.save_quiz(&quiz).await.expect("save quiz");

    let mut preview = quizzes
        .preview_for_lesson(deck.id())
        .await
        .expect("preview");
    preview.select_answer(1).unwrap();
    preview.next().unwrap();
    preview.write_answer("because").unwrap();
    let score = quizzes.submit(&mut preview).expect("submit");
    assert_eq!(score.correct_count, 1);
    assert_eq!(score.percentage, 50);
    assert!(!score.passed);

    preview.restart();
    assert!(preview.responses().is_empty());
    assert_eq!(preview.current_index(), Some(0));
}
