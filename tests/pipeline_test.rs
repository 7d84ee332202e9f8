use std::sync::Arc;

use flashgen::collection::CollectionStore;
use flashgen::config::Config;
use flashgen::core::{FlashcardRecord, Mode, TextSegments};
use flashgen::export;
use flashgen::generator::{GenerationRequest, Generator};

mod common;
use common::mock_backend::MockBackend;

fn generator(reply: &str) -> (Generator, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::new(reply));
    (Generator::new(backend.clone(), Config::default()), backend)
}

#[tokio::test]
async fn test_flashcards_to_csv() {
    let (generator, backend) = generator(
        "Here you go:\n<Q>What is the boiling point of water?</Q>\n<A>100 °C at sea level</A>\n\
         <Q>What is H2O?</Q><A>Water, chemically</A>",
    );

    let request = GenerationRequest::new(Mode::Flashcard, "Water boils at 100 °C at sea level.");
    let outcome = generator.generate_outcome(&request).await;
    assert!(outcome.success);
    assert_eq!(outcome.flashcards.len(), 2);
    assert!(backend.was_prompted("Water boils at 100 °C at sea level."));

    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(dir.path().join("collections.db")).unwrap();
    store.add(Mode::Flashcard, &outcome.flashcards).unwrap();

    let csv = export::to_csv(Mode::Flashcard, &store.list(Mode::Flashcard).unwrap());
    assert_eq!(
        csv,
        "Question,Answer\n\
         What is the boiling point of water?,100 °C at sea level\n\
         What is H2O?,\"Water, chemically\"\n"
    );
}

#[tokio::test]
async fn test_explanations_share_flashcard_collection() {
    let (generator, _) = generator("Photosynthesis turns light into sugar.");
    let records = generator
        .generate(&GenerationRequest::new(Mode::Explain, "photosynthesis"))
        .await
        .unwrap();
    assert_eq!(
        records,
        vec![FlashcardRecord::Explanation {
            answer: "Photosynthesis turns light into sugar.".to_string()
        }]
    );

    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::new(dir.path().join("collections.db")).unwrap();
    store
        .add(
            Mode::Flashcard,
            &[FlashcardRecord::Basic {
                question: "Q".to_string(),
                answer: "A".to_string(),
            }],
        )
        .unwrap();
    store.add(Mode::Explain, &records).unwrap();

    assert_eq!(store.count(Mode::Flashcard).unwrap(), 2);
    assert_eq!(store.count(Mode::Language).unwrap(), 0);
    assert_eq!(store.list(Mode::Explain).unwrap()[1], records[0]);
}

#[tokio::test]
async fn test_language_card_from_page_context() {
    let (generator, backend) = generator(
        "<T>khéo léo</T><Q>Her deft hands fixed it.</Q><A>skillful and quick</A>",
    );

    let page = TextSegments::new(vec![
        "Chapter one".to_string(),
        "The clock had stopped. With deft fingers she opened the case. It ticked again."
            .to_string(),
    ]);
    let request = GenerationRequest::new(Mode::Language, "deft").with_page_text(&page, 50);

    let records = generator.generate(&request).await.unwrap();
    assert_eq!(
        records,
        vec![FlashcardRecord::LanguageEntry {
            word: "deft".to_string(),
            translation: "khéo léo".to_string(),
            example: "Her deft hands fixed it.".to_string(),
            meaning: "skillful and quick".to_string(),
        }]
    );
    assert!(backend.was_prompted("With <b>deft</b> fingers she opened the case."));
    assert!(backend.was_prompted("Vietnamese"));

    let csv = export::to_csv(Mode::Language, &records);
    assert_eq!(
        csv,
        "Word,Translation,Question,Answer\ndeft,khéo léo,Her deft hands fixed it.,skillful and quick\n"
    );
}

#[tokio::test]
async fn test_backend_failure_is_reported() {
    let (generator, backend) = generator("<Q>x</Q><A>y</A>");
    *backend.should_fail.lock().unwrap() = true;

    let outcome = generator
        .generate_outcome(&GenerationRequest::new(Mode::Flashcard, "anything"))
        .await;
    assert!(!outcome.success);
    assert!(outcome.flashcards.is_empty());
    assert_eq!(
        outcome.error.as_deref(),
        Some("API request failed (529): Overloaded")
    );
    assert_eq!(backend.get_prompts().len(), 1);
}

#[tokio::test]
async fn test_custom_prompt_override() {
    let backend = Arc::new(MockBackend::new("<Q>a</Q><A>b</A>"));
    let config = Config {
        flashcard_prompt: "Make one card about: {text}".to_string(),
        ..Config::default()
    };
    let generator = Generator::new(backend.clone(), config);

    generator
        .generate(&GenerationRequest::new(Mode::Flashcard, "tides"))
        .await
        .unwrap();
    assert_eq!(backend.get_prompts(), vec!["Make one card about: tides".to_string()]);
}

#[tokio::test]
async fn test_context_file_wrapping_mid_sentence() {
    let (generator, backend) = generator("<T>con mèo</T><Q>The cat sleeps.</Q><A>a small pet</A>");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.txt");
    std::fs::write(&path, "Intro. The cat sat on the\nmat today. Next one.").unwrap();

    let page = TextSegments::from_text(&std::fs::read_to_string(&path).unwrap());
    let request = GenerationRequest::new(Mode::Language, "cat").with_page_text(&page, 50);
    assert_eq!(
        request.context.as_deref(),
        Some("The <b>cat</b> sat on the\nmat today.")
    );

    generator.generate(&request).await.unwrap();
    assert!(backend.was_prompted("Sentence: The <b>cat</b> sat on the\nmat today."));
    assert!(!backend.was_prompted("themat"));
}
