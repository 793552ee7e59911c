use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use geojson::FeatureCollection;

use super::region::{county_regions, state_regions, Region};
use super::source::{Fetch, Resource};
use super::{parse_json, CountyData, LoadError, StateData};

/// Identifies which view mount and which request a result belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub mount: u64,
    pub seq: u64,
}

/// Work a view can ask the loader to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    /// State rows, county rows by state and the state boundaries, as one unit
    MapBase,
    /// County boundaries for one state, filtered by FIPS prefix
    CountyShapes { state: String, prefix: String },
    /// Flat county rows for the scatter plot
    Scatter,
}

/// Everything the map needs before it can leave the loading gate
#[derive(Debug, Default)]
pub struct MapBase {
    pub states: Vec<StateData>,
    pub counties_by_state: HashMap<String, Vec<CountyData>>,
    pub state_regions: Vec<Region>,
}

#[derive(Debug)]
pub enum Outcome {
    MapBase(Result<MapBase, LoadError>),
    CountyShapes {
        state: String,
        result: Result<Vec<Region>, LoadError>,
    },
    Scatter(Result<Vec<CountyData>, LoadError>),
}

/// A finished job, tagged with the ticket it was submitted under
#[derive(Debug)]
pub struct Loaded {
    pub ticket: Ticket,
    pub outcome: Outcome,
}

fn fetch_json<T>(source: &dyn Fetch, resource: Resource) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = source.fetch(resource)?;
    parse_json(resource, bytes)
}

fn load_map_base(source: &dyn Fetch) -> Result<MapBase, LoadError> {
    // All three in parallel; any failure fails the unit
    let (states, (counties, shapes)) = rayon::join(
        || fetch_json::<Vec<StateData>>(source, Resource::StateData),
        || {
            rayon::join(
                || fetch_json::<HashMap<String, Vec<CountyData>>>(source, Resource::CountyByState),
                || fetch_json::<FeatureCollection>(source, Resource::StateShapes),
            )
        },
    );
    let (states, counties_by_state, shapes) = (states?, counties?, shapes?);

    log::info!("Loaded state data: {} states", states.len());
    log::info!("Loaded county data for {} states", counties_by_state.len());
    log::info!("State GeoJSON features: {}", shapes.features.len());

    let state_regions = state_regions(shapes);
    log::info!("Continental state regions: {}", state_regions.len());

    Ok(MapBase {
        states,
        counties_by_state,
        state_regions,
    })
}

/// Run a job to completion on the current thread
pub fn run_job(source: &dyn Fetch, job: Job) -> Outcome {
    match job {
        Job::MapBase => Outcome::MapBase(load_map_base(source)),
        Job::CountyShapes { state, prefix } => {
            let result = fetch_json::<FeatureCollection>(source, Resource::CountyShapes)
                .map(|fc| county_regions(fc, &prefix));
            if let Ok(regions) = &result {
                log::info!("Loaded {} county regions for {state}", regions.len());
            }
            Outcome::CountyShapes { state, result }
        }
        Job::Scatter => Outcome::Scatter(fetch_json(source, Resource::CountyScatter)),
    }
}

/// Runs jobs on worker threads and hands results back over a channel.
///
/// The UI thread drains results with [`Loader::try_recv`] once per frame.
pub struct Loader {
    source: Arc<dyn Fetch>,
    tx: Sender<Loaded>,
    rx: Receiver<Loaded>,
}

impl Loader {
    pub fn new(source: Arc<dyn Fetch>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source, tx, rx }
    }

    /// Start a job in the background. No cancellation: superseded results
    /// still arrive and are filtered by ticket on the receiving side.
    pub fn submit(&self, ticket: Ticket, job: Job) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        log::debug!("submitting {job:?} for {ticket:?}");

        let spawned = thread::Builder::new()
            .name(format!("loader-{}-{}", ticket.mount, ticket.seq))
            .spawn(move || {
                let outcome = run_job(source.as_ref(), job);
                // Receiver gone means the app is shutting down
                let _ = tx.send(Loaded { ticket, outcome });
            });

        if let Err(e) = spawned {
            log::error!("failed to spawn loader thread: {e}");
        }
    }

    /// Next finished job, if any
    pub fn try_recv(&self) -> Option<Loaded> {
        match self.rx.try_recv() {
            Ok(loaded) => Some(loaded),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}
