//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use wayfarer_ai::{
    AiError, ContentModerator, Keyword, ModerationVerdict, QueryRefinement, RankingModel,
    RankingRequest, Refinement, ScoredPlace,
};
use wayfarer_core::{LatLng, PlaceId};
use wayfarer_integration::{
    ConnectorError, PlaceRecord, PlaceStub, PlacesConnector, Review, TravelTimes,
};

pub fn ids(raw: &[&str]) -> Vec<PlaceId> {
    raw.iter().map(|id| PlaceId::from(*id)).collect()
}

/// Place services backed by fixed data.
pub struct FakePlaces {
    results: Mutex<Vec<PlaceStub>>,
    search_fails: bool,
    failing_details: HashSet<PlaceId>,
    travel: TravelTimes,
    travel_fails: bool,
    pub searches: Mutex<Vec<(String, u32)>>,
    pub detail_calls: AtomicUsize,
    pub travel_batches: Mutex<Vec<Vec<PlaceId>>>,
}

impl FakePlaces {
    pub fn with_results(raw: &[&str]) -> Self {
        Self {
            results: Mutex::new(ids(raw).into_iter().map(PlaceStub::new).collect()),
            search_fails: false,
            failing_details: HashSet::new(),
            travel: TravelTimes::new(),
            travel_fails: false,
            searches: Mutex::new(Vec::new()),
            detail_calls: AtomicUsize::new(0),
            travel_batches: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_search() -> Self {
        Self {
            search_fails: true,
            ..Self::with_results(&[])
        }
    }

    pub fn failing_details(mut self, raw: &[&str]) -> Self {
        self.failing_details = ids(raw).into_iter().collect();
        self
    }

    pub fn with_travel(mut self, times: &[(&str, &str)]) -> Self {
        self.travel = times
            .iter()
            .map(|(id, text)| (PlaceId::from(*id), (*text).to_string()))
            .collect();
        self
    }

    pub fn failing_travel(mut self) -> Self {
        self.travel_fails = true;
        self
    }

    pub fn set_results(&self, raw: &[&str]) {
        *self.results.lock().unwrap() = ids(raw).into_iter().map(PlaceStub::new).collect();
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }

    pub fn last_search(&self) -> (String, u32) {
        self.searches.lock().unwrap().last().cloned().expect("no search made")
    }
}

#[async_trait]
impl PlacesConnector for FakePlaces {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search_nearby(
        &self,
        _origin: LatLng,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceStub>, ConnectorError> {
        self.searches
            .lock()
            .unwrap()
            .push((keyword.to_string(), radius_m));
        if self.search_fails {
            return Err(ConnectorError::Timeout);
        }
        Ok(self.results.lock().unwrap().clone())
    }

    async fn place_details(&self, place_id: &PlaceId) -> Result<PlaceRecord, ConnectorError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(place_id) {
            return Err(ConnectorError::ServiceStatus {
                operation: "details".to_string(),
                status: "NOT_FOUND".to_string(),
                message: None,
            });
        }
        Ok(PlaceRecord {
            place_id: place_id.clone(),
            name: format!("Place {place_id}"),
            rating: Some(4.5),
            user_ratings_total: Some(100),
            types: vec!["restaurant".to_string()],
            reviews: (1..=4)
                .map(|i| Review {
                    author_name: None,
                    rating: Some(5.0),
                    text: format!("{place_id} review {i}"),
                })
                .collect(),
            photo_references: (1..=5).map(|i| format!("{place_id}-photo-{i}")).collect(),
            ..PlaceRecord::default()
        })
    }

    async fn travel_times(
        &self,
        _origin: LatLng,
        place_ids: &[PlaceId],
    ) -> Result<TravelTimes, ConnectorError> {
        self.travel_batches.lock().unwrap().push(place_ids.to_vec());
        if self.travel_fails {
            return Err(ConnectorError::Timeout);
        }
        Ok(place_ids
            .iter()
            .filter_map(|id| self.travel.get(id).map(|t| (id.clone(), t.clone())))
            .collect())
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!("https://photos.test/{photo_reference}")
    }
}

/// Moderator with a fixed verdict.
pub struct FakeModerator {
    verdict: Mutex<ModerationVerdict>,
    pub calls: AtomicUsize,
}

impl FakeModerator {
    pub fn safe() -> Self {
        Self {
            verdict: Mutex::new(ModerationVerdict::Safe),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, verdict: ModerationVerdict) {
        *self.verdict.lock().unwrap() = verdict;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentModerator for FakeModerator {
    async fn moderate(&self, _text: &str) -> ModerationVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.lock().unwrap().clone()
    }
}

/// Refiner that replays queued answers, then repeats a fallback.
pub struct FakeRefiner {
    queued: Mutex<VecDeque<Refinement>>,
    fallback: Mutex<Refinement>,
    pub transcripts: Mutex<Vec<String>>,
}

impl FakeRefiner {
    pub fn keyword(keyword: &str) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Refinement::Keyword(
                Keyword::normalize(keyword).expect("non-empty keyword"),
            )),
            transcripts: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, refinement: Refinement) {
        *self.fallback.lock().unwrap() = refinement;
    }

    pub fn push(&self, refinement: Refinement) {
        self.queued.lock().unwrap().push_back(refinement);
    }

    pub fn call_count(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    pub fn last_transcript(&self) -> String {
        self.transcripts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("refiner not called")
    }
}

#[async_trait]
impl QueryRefinement for FakeRefiner {
    async fn refine(&self, transcript: &str) -> Refinement {
        self.transcripts.lock().unwrap().push(transcript.to_string());
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

/// How [`FakeRanker`] answers.
#[derive(Debug, Clone)]
pub enum RankBehavior {
    /// Ranks the first `n` candidates in reverse order of appearance.
    ReverseFirst(usize),
    /// Returns exactly these scored ids.
    Fixed(Vec<(PlaceId, f64)>),
    Fail,
    Panic,
}

pub struct FakeRanker {
    behavior: Mutex<RankBehavior>,
    pub requests: Mutex<Vec<RankingRequest>>,
}

impl FakeRanker {
    pub fn new(behavior: RankBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, behavior: RankBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> RankingRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("ranker not called")
    }
}

pub fn scored(place_id: &PlaceId, final_score: f64) -> ScoredPlace {
    ScoredPlace {
        place_id: place_id.clone(),
        relevance_score: final_score,
        quality_score: final_score,
        vibe_score: final_score,
        convenience_score: final_score,
        final_score,
        justification: format!("{place_id} fits"),
    }
}

#[async_trait]
impl RankingModel for FakeRanker {
    async fn rank(&self, request: &RankingRequest) -> Result<Vec<ScoredPlace>, AiError> {
        self.requests.lock().unwrap().push(request.clone());
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            RankBehavior::ReverseFirst(n) => Ok(request
                .candidates
                .iter()
                .take(n)
                .enumerate()
                .map(|(i, c)| scored(&c.place_id, i as f64))
                .rev()
                .collect()),
            RankBehavior::Fixed(list) => Ok(list.iter().map(|(id, s)| scored(id, *s)).collect()),
            RankBehavior::Fail => Err(AiError::EmptyOutput {
                operation: "ranking".to_string(),
            }),
            RankBehavior::Panic => panic!("ranker exploded"),
        }
    }
}
