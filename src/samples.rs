//! Decoded sample buffers for every instrument and drum stroke.
//!
//! Each asset is fetched and decoded at most once. A failed load is logged
//! and leaves the asset unloaded so a later attempt can retry it.

use std::{collections::HashMap, fmt, sync::Arc};

use tracing::{debug, error, info};

use crate::{
    instrument::{Instrument, NoteName, PercussionSound},
    io::{decode, resample, AssetSource},
    Result,
};

/// Identifies one loadable sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleId {
    Piri,
    Haegeum,
    Drum(PercussionSound),
}

impl SampleId {
    pub const ALL: [SampleId; 8] = [
        SampleId::Piri,
        SampleId::Haegeum,
        SampleId::Drum(PercussionSound::Kung),
        SampleId::Drum(PercussionSound::Duk),
        SampleId::Drum(PercussionSound::Gideok),
        SampleId::Drum(PercussionSound::Tak),
        SampleId::Drum(PercussionSound::Tta),
        SampleId::Drum(PercussionSound::Roll),
    ];

    /// Sample backing a melodic instrument; `None` for the janggu.
    pub fn melodic(instrument: Instrument) -> Option<Self> {
        match instrument {
            Instrument::Piri => Some(SampleId::Piri),
            Instrument::Haegeum => Some(SampleId::Haegeum),
            Instrument::Janggu => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SampleId::Piri => "piri",
            SampleId::Haegeum => "haegeum",
            SampleId::Drum(sound) => sound.as_str(),
        }
    }

    /// Path relative to the asset root.
    pub fn default_path(self) -> &'static str {
        match self {
            SampleId::Piri => "sounds/KoreanPiriNOTE.mp3",
            SampleId::Haegeum => "sounds/KoreanHeageum.mp3",
            SampleId::Drum(PercussionSound::Kung) => "sounds/kung.mp3",
            SampleId::Drum(PercussionSound::Duk) => "sounds/duk.mp3",
            SampleId::Drum(PercussionSound::Gideok) => "sounds/gideok.mp3",
            SampleId::Drum(PercussionSound::Tak) => "sounds/tak.mp3",
            SampleId::Drum(PercussionSound::Tta) => "sounds/tta.mp3",
            SampleId::Drum(PercussionSound::Roll) => "sounds/roll.mp3",
        }
    }

    /// Pitch the recording was made at. Drum samples are never repitched.
    pub fn base_frequency(self) -> Option<f32> {
        match self {
            SampleId::Piri => Some(NoteName::C5.frequency()),
            SampleId::Haegeum => Some(NoteName::A4.frequency()),
            SampleId::Drum(_) => None,
        }
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable, decoded mono buffer.
#[derive(Debug, Clone)]
pub struct SampleAsset {
    pub buffer: Arc<[f32]>,
    pub sample_rate: f32,
    pub base_frequency: Option<f32>,
}

impl SampleAsset {
    pub fn new(buffer: impl Into<Arc<[f32]>>, sample_rate: f32, base_frequency: Option<f32>) -> Self {
        Self {
            buffer: buffer.into(),
            sample_rate,
            base_frequency,
        }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        self.buffer.len() as f32 / self.sample_rate
    }
}

/// Cheap to clone: buffers and the asset source are shared.
#[derive(Clone)]
pub struct SampleStore {
    sample_rate: f32,
    source: Arc<dyn AssetSource>,
    overrides: HashMap<SampleId, String>,
    assets: HashMap<SampleId, SampleAsset>,
}

impl SampleStore {
    /// Buffers are resampled to `sample_rate` as they load.
    pub fn new(source: Arc<dyn AssetSource>, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            source,
            overrides: HashMap::new(),
            assets: HashMap::new(),
        }
    }

    /// Replace the path for one sample.
    pub fn with_path(mut self, id: SampleId, path: impl Into<String>) -> Self {
        self.overrides.insert(id, path.into());
        self
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn path(&self, id: SampleId) -> &str {
        self.overrides
            .get(&id)
            .map(String::as_str)
            .unwrap_or(id.default_path())
    }

    pub fn get(&self, id: SampleId) -> Option<&SampleAsset> {
        self.assets.get(&id)
    }

    pub fn is_loaded(&self, id: SampleId) -> bool {
        self.assets.contains_key(&id)
    }

    pub fn loaded_count(&self) -> usize {
        self.assets.len()
    }

    /// Install an already-decoded asset.
    pub fn insert(&mut self, id: SampleId, asset: SampleAsset) {
        self.assets.insert(id, asset);
    }

    /// Fetch and decode `id` unless it is already loaded.
    ///
    /// Returns whether the asset is loaded afterwards. Failures are logged.
    pub fn load(&mut self, id: SampleId) -> bool {
        if self.is_loaded(id) {
            debug!(sample = %id, "already loaded");
            return true;
        }

        match self.fetch_and_decode(id) {
            Ok(asset) => {
                info!(
                    sample = %id,
                    seconds = asset.duration(),
                    "sample loaded"
                );
                self.assets.insert(id, asset);
                true
            }
            Err(err) => {
                error!(sample = %id, path = self.path(id), %err, "sample failed to load");
                false
            }
        }
    }

    /// Load every sample, each independently of the others.
    ///
    /// Returns the number of samples loaded afterwards.
    pub fn load_all(&mut self) -> usize {
        for id in SampleId::ALL {
            self.load(id);
        }
        self.loaded_count()
    }

    /// Merge assets loaded elsewhere (e.g. by a background loader).
    pub fn absorb(&mut self, other: SampleStore) {
        for (id, asset) in other.assets {
            self.assets.entry(id).or_insert(asset);
        }
    }

    fn fetch_and_decode(&self, id: SampleId) -> Result<SampleAsset> {
        let bytes = self.source.fetch(self.path(id))?;
        let decoded = decode(&bytes)?;
        let buffer = resample(&decoded.samples, decoded.sample_rate as f32, self.sample_rate);
        Ok(SampleAsset::new(buffer, self.sample_rate, id.base_frequency()))
    }
}

impl fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleStore")
            .field("sample_rate", &self.sample_rate)
            .field("loaded", &self.assets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{
        wav::{encode, WavEncoding},
        MemoryAssetSource,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        inner: MemoryAssetSource,
        fetches: AtomicUsize,
    }

    impl AssetSource for CountingSource {
        fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(path)
        }
    }

    fn tone_wav(seconds: f32, sample_rate: u32) -> Vec<u8> {
        let samples = vec![0.25f32; (seconds * sample_rate as f32) as usize];
        encode([&samples[..]], sample_rate, WavEncoding::Float32).unwrap()
    }

    #[test]
    fn load_is_idempotent() {
        let source = Arc::new(CountingSource {
            inner: MemoryAssetSource::new()
                .with_file("sounds/KoreanPiriNOTE.mp3", tone_wav(0.5, 44_100)),
            fetches: AtomicUsize::new(0),
        });
        let mut store = SampleStore::new(source.clone(), 44_100.0);

        assert!(store.load(SampleId::Piri));
        assert!(store.load(SampleId::Piri));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let asset = store.get(SampleId::Piri).unwrap();
        assert_eq!(asset.base_frequency, Some(523.25));
        assert_eq!(asset.buffer.len(), 22_050);
    }

    #[test]
    fn failed_load_stays_unloaded() {
        let source = Arc::new(MemoryAssetSource::new().with_file("sounds/kung.mp3", b"junk".to_vec()));
        let mut store = SampleStore::new(source, 44_100.0);

        assert!(!store.load(SampleId::Drum(PercussionSound::Kung)));
        assert!(!store.load(SampleId::Haegeum));
        assert_eq!(store.loaded_count(), 0);
    }

    #[test]
    fn empty_sample_file_stays_unloaded() {
        let source = Arc::new(
            MemoryAssetSource::new().with_file(SampleId::Piri.default_path(), tone_wav(0.0, 44_100)),
        );
        let mut store = SampleStore::new(source, 44_100.0);

        assert!(!store.load(SampleId::Piri));
        assert!(!store.is_loaded(SampleId::Piri));
        assert!(store.get(SampleId::Piri).is_none());
    }

    #[test]
    fn one_missing_drum_does_not_block_the_rest() {
        let mut source = MemoryAssetSource::new();
        for sound in [PercussionSound::Kung, PercussionSound::Tak] {
            source.insert(SampleId::Drum(sound).default_path(), tone_wav(0.1, 44_100));
        }
        let mut store = SampleStore::new(Arc::new(source), 44_100.0);

        assert_eq!(store.load_all(), 2);
        assert!(store.is_loaded(SampleId::Drum(PercussionSound::Tak)));
        assert!(!store.is_loaded(SampleId::Drum(PercussionSound::Duk)));
    }

    #[test]
    fn loads_are_resampled_to_store_rate() {
        let source = MemoryAssetSource::new().with_file("sounds/KoreanHeageum.mp3", tone_wav(1.0, 22_050));
        let mut store = SampleStore::new(Arc::new(source), 44_100.0);

        assert!(store.load(SampleId::Haegeum));
        let asset = store.get(SampleId::Haegeum).unwrap();
        assert_eq!(asset.sample_rate, 44_100.0);
        assert_eq!(asset.buffer.len(), 44_100);
    }

    #[test]
    fn path_overrides_are_used() {
        let source = MemoryAssetSource::new().with_file("custom/piri.wav", tone_wav(0.2, 44_100));
        let mut store =
            SampleStore::new(Arc::new(source), 44_100.0).with_path(SampleId::Piri, "custom/piri.wav");

        assert_eq!(store.path(SampleId::Piri), "custom/piri.wav");
        assert!(store.load(SampleId::Piri));
    }

    #[test]
    fn absorb_keeps_existing_assets() {
        let source: Arc<dyn AssetSource> = Arc::new(MemoryAssetSource::new());
        let mut main = SampleStore::new(source.clone(), 100.0);
        main.insert(SampleId::Piri, SampleAsset::new(vec![1.0f32], 100.0, Some(523.25)));

        let mut loaded = SampleStore::new(source, 100.0);
        loaded.insert(SampleId::Piri, SampleAsset::new(vec![2.0f32], 100.0, Some(523.25)));
        loaded.insert(SampleId::Haegeum, SampleAsset::new(vec![3.0f32], 100.0, Some(440.0)));

        main.absorb(loaded);
        assert_eq!(main.get(SampleId::Piri).unwrap().buffer[0], 1.0);
        assert!(main.is_loaded(SampleId::Haegeum));
    }
}
