//! Joke pool lifecycle: priming, refills, and playback selection.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cleaner::remove_noise_characters;
use crate::error::Result;
use crate::models::{AudioJoke, ContentCategory, SessionState};
use crate::provider::JokeProvider;
use crate::speech::joke_ssml;
use crate::store::StateStore;
use crate::tts::SpeechSynthesizer;

/// Jokes fetched per category when a new user first shows up.
pub const PRIME_COUNT: usize = 5;

/// Fetch one joke, clean it, and hand it to the synthesizer.
///
/// The stored `text` is the full SSML document the synthesizer received.
async fn acquire_joke(
    provider: &dyn JokeProvider,
    synthesizer: &dyn SpeechSynthesizer,
    category: ContentCategory,
) -> Result<AudioJoke> {
    let raw = provider.fetch_joke(category).await?;
    let text = remove_noise_characters(&raw);
    let ssml = joke_ssml(&text);
    let audio_file_uri = synthesizer.synthesize(category, &ssml).await?;

    Ok(AudioJoke::new(ssml, audio_file_uri))
}

/// Drives the joke pools: priming for new users, one refill per turn after.
pub struct JokePoolManager {
    provider: Arc<dyn JokeProvider>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn StateStore>,
}

impl JokePoolManager {
    pub fn new(
        provider: Arc<dyn JokeProvider>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            provider,
            synthesizer,
            store,
        }
    }

    /// Fill every category pool for a first-time user.
    ///
    /// Categories are primed concurrently. Each joke that arrives is appended
    /// to its pool and the state saved right away, so an interrupted priming
    /// run keeps whatever it had won. Acquisition and save failures are
    /// logged and skipped; the turn must still answer.
    pub async fn prime_all_categories(&self, user_id: &str, state: &mut SessionState) {
        let (tx, mut rx) = mpsc::channel(PRIME_COUNT * ContentCategory::ALL.len());
        let mut tasks = JoinSet::new();

        for category in ContentCategory::ALL {
            let provider = Arc::clone(&self.provider);
            let synthesizer = Arc::clone(&self.synthesizer);
            let tx = tx.clone();
            tasks.spawn(async move {
                for _ in 0..PRIME_COUNT {
                    match acquire_joke(provider.as_ref(), synthesizer.as_ref(), category).await {
                        Ok(joke) => {
                            if tx.send((category, joke)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(category = %category, error = %e, "Failed to acquire joke while priming");
                        }
                    }
                }
            });
        }
        drop(tx);

        while let Some((category, joke)) = rx.recv().await {
            state.pool_mut(category).push(joke);
            if let Err(e) = self.store.save(user_id, state).await {
                error!(error = %e, "Failed to save state while priming");
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Priming task failed");
            }
        }

        info!(
            anecdotes = state.pool(ContentCategory::Anecdotes).len(),
            aphorisms = state.pool(ContentCategory::Aphorisms).len(),
            adults = state.pool(ContentCategory::Adults).len(),
            "Primed joke pools"
        );
    }

    /// Top up the active category with a single joke.
    ///
    /// Runs once per turn for returning users. On failure the pool stays as
    /// it was and the turn answers from what is already there.
    pub async fn refill_selected_category(&self, user_id: &str, state: &mut SessionState) {
        let category = state.content_type;
        match acquire_joke(self.provider.as_ref(), self.synthesizer.as_ref(), category).await {
            Ok(joke) => {
                state.pool_mut(category).push(joke);
                if let Err(e) = self.store.save(user_id, state).await {
                    error!(error = %e, "Failed to save state after refill");
                }
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Failed to refill joke pool");
            }
        }
    }
}

/// Pick a uniformly random index below `len`. `len` must be non-zero.
pub fn pick_uniform(rng: &mut impl Rng, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// Choose a joke to play, never the most recently added one.
///
/// The newest entry may still be synthesizing, so it stays off limits until
/// a later joke lands behind it. Pools with fewer than two jokes yield
/// nothing.
pub fn select_for_playback<'a>(pool: &'a [AudioJoke], rng: &mut impl Rng) -> Option<&'a AudioJoke> {
    if pool.len() < 2 {
        return None;
    }

    let index = pick_uniform(rng, pool.len() - 1);
    pool.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeProvider {
        fixed: Option<&'static str>,
        counter: AtomicUsize,
    }

    impl FakeProvider {
        fn numbered() -> Self {
            Self {
                fixed: None,
                counter: AtomicUsize::new(0),
            }
        }

        fn fixed(text: &'static str) -> Self {
            Self {
                fixed: Some(text),
                counter: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JokeProvider for FakeProvider {
        async fn fetch_joke(&self, _category: ContentCategory) -> Result<String> {
            match self.fixed {
                Some(text) => Ok(text.to_owned()),
                None => {
                    let n = self.counter.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("joke {}", n))
                }
            }
        }
    }

    #[derive(Default)]
    struct FakeSynthesizer {
        fail_categories: Vec<ContentCategory>,
        ssml_log: Mutex<Vec<String>>,
    }

    impl FakeSynthesizer {
        fn failing_for(categories: &[ContentCategory]) -> Self {
            Self {
                fail_categories: categories.to_vec(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynthesizer {
        async fn synthesize(&self, category: ContentCategory, ssml: &str) -> Result<String> {
            if self.fail_categories.contains(&category) {
                return Err(Error::Synthesis("polly unavailable".to_owned()));
            }
            let mut log = self.ssml_log.lock().unwrap();
            log.push(ssml.to_owned());
            Ok(format!(
                "https://s3.us-east-1.amazonaws.com/jokes-bucket/{}/joke.{}.mp3",
                category.slot_id(),
                log.len()
            ))
        }
    }

    #[derive(Default)]
    struct InMemoryStore {
        saves: Mutex<Vec<SessionState>>,
        fail_saves: bool,
    }

    #[async_trait]
    impl StateStore for InMemoryStore {
        async fn load(&self, _user_id: &str) -> Result<Option<SessionState>> {
            Ok(self.saves.lock().unwrap().last().cloned())
        }

        async fn save(&self, _user_id: &str, state: &SessionState) -> Result<()> {
            if self.fail_saves {
                return Err(Error::Storage("bucket unavailable".to_owned()));
            }
            self.saves.lock().unwrap().push(state.clone());
            Ok(())
        }
    }

    fn build_manager(
        provider: FakeProvider,
        synthesizer: FakeSynthesizer,
        store: InMemoryStore,
    ) -> (JokePoolManager, Arc<FakeSynthesizer>, Arc<InMemoryStore>) {
        let synthesizer = Arc::new(synthesizer);
        let store = Arc::new(store);
        let manager = JokePoolManager::new(
            Arc::new(provider),
            Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizer>,
            Arc::clone(&store) as Arc<dyn StateStore>,
        );
        (manager, synthesizer, store)
    }

    #[tokio::test]
    async fn test_priming_fills_every_pool() {
        let (manager, _, store) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::default(),
            InMemoryStore::default(),
        );
        let mut state = SessionState::default();

        manager.prime_all_categories("user", &mut state).await;

        for category in ContentCategory::ALL {
            assert_eq!(state.pool(category).len(), PRIME_COUNT);
        }
        let saves = store.saves.lock().unwrap();
        assert_eq!(saves.len(), PRIME_COUNT * ContentCategory::ALL.len());
        assert_eq!(saves.last(), Some(&state));
    }

    #[tokio::test]
    async fn test_priming_absorbs_synthesis_failures() {
        let (manager, _, _) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::failing_for(&[ContentCategory::Adults]),
            InMemoryStore::default(),
        );
        let mut state = SessionState::default();

        manager.prime_all_categories("user", &mut state).await;

        assert_eq!(state.pool(ContentCategory::Anecdotes).len(), PRIME_COUNT);
        assert_eq!(state.pool(ContentCategory::Aphorisms).len(), PRIME_COUNT);
        assert!(state.pool(ContentCategory::Adults).is_empty());
    }

    #[tokio::test]
    async fn test_failed_priming_recovers_only_through_refills() {
        let (manager, _, _) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::failing_for(&ContentCategory::ALL),
            InMemoryStore::default(),
        );
        let mut state = SessionState::default();

        manager.prime_all_categories("user", &mut state).await;
        for category in ContentCategory::ALL {
            assert!(state.pool(category).is_empty());
        }

        // Later turns add at most one joke each, so playback stays silent
        // until two refills have landed.
        let (manager, _, _) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::default(),
            InMemoryStore::default(),
        );
        manager.refill_selected_category("user", &mut state).await;
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_for_playback(state.pool(state.content_type), &mut rng).is_none());

        manager.refill_selected_category("user", &mut state).await;
        assert_eq!(state.pool(state.content_type).len(), 2);
        assert!(select_for_playback(state.pool(state.content_type), &mut rng).is_some());
    }

    #[tokio::test]
    async fn test_refill_appends_one_joke_to_selected_pool() {
        let (manager, _, store) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::default(),
            InMemoryStore::default(),
        );
        let mut state = SessionState {
            content_type: ContentCategory::Aphorisms,
            skill_called_first_time: false,
            ..SessionState::default()
        };

        manager.refill_selected_category("user", &mut state).await;

        assert_eq!(state.pool(ContentCategory::Aphorisms).len(), 1);
        assert!(state.pool(ContentCategory::Anecdotes).is_empty());
        assert!(state.pool(ContentCategory::Adults).is_empty());
        assert_eq!(store.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refill_keeps_joke_when_save_fails() {
        let (manager, _, store) = build_manager(
            FakeProvider::numbered(),
            FakeSynthesizer::default(),
            InMemoryStore {
                fail_saves: true,
                ..InMemoryStore::default()
            },
        );
        let mut state = SessionState::default();

        manager.refill_selected_category("user", &mut state).await;

        assert_eq!(state.pool(state.content_type).len(), 1);
        assert!(store.saves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_acquired_jokes_store_the_synthesized_ssml() {
        let (manager, synthesizer, _) = build_manager(
            FakeProvider::fixed("Шутка...\r\nКонец"),
            FakeSynthesizer::default(),
            InMemoryStore::default(),
        );
        let mut state = SessionState::default();

        manager.refill_selected_category("user", &mut state).await;

        // The persisted text is the SSML document itself, cleaned text inside.
        let joke = &state.pool(state.content_type)[0];
        assert_eq!(
            joke.text,
            "<speak><prosody volume=\"x-loud\"><lang xml:lang=\"ru-RU\">Шутка.  Конец</lang></prosody></speak>"
        );
        let ssml_log = synthesizer.ssml_log.lock().unwrap();
        assert_eq!(ssml_log[0], joke.text);
    }

    #[test]
    fn test_selection_needs_at_least_two_jokes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_for_playback(&[], &mut rng).is_none());

        let pool = vec![AudioJoke::new("a", "uri-a")];
        assert!(select_for_playback(&pool, &mut rng).is_none());
    }

    #[test]
    fn test_selection_never_returns_newest_joke() {
        let pool: Vec<AudioJoke> = (0..5)
            .map(|n| AudioJoke::new(format!("joke {}", n), format!("uri-{}", n)))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();

        for _ in 0..200 {
            let joke = select_for_playback(&pool, &mut rng).unwrap();
            assert_ne!(joke.text, "joke 4");
            seen.insert(joke.text.clone());
        }

        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_two_joke_pool_always_plays_the_older_one() {
        let pool = vec![AudioJoke::new("old", "uri-old"), AudioJoke::new("new", "uri-new")];
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            assert_eq!(select_for_playback(&pool, &mut rng).unwrap().text, "old");
        }
    }

    #[test]
    fn test_pick_uniform_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert!(pick_uniform(&mut rng, 5) < 5);
        }
    }
}
