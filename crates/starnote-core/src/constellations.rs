//! Observation checklist of the 88 IAU constellations.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::prefs::PreferenceStore;

const CONSTELLATIONS_FILE: &str = "constellations";
const KEY_OBSERVED: &str = "observed";

pub const CONSTELLATIONS: [&str; 88] = [
    "Andromeda",
    "Antlia",
    "Apus",
    "Aquarius",
    "Aquila",
    "Ara",
    "Aries",
    "Auriga",
    "Bootes",
    "Caelum",
    "Camelopardalis",
    "Cancer",
    "Canes Venatici",
    "Canis Major",
    "Canis Minor",
    "Capricornus",
    "Carina",
    "Cassiopeia",
    "Centaurus",
    "Cepheus",
    "Cetus",
    "Chamaeleon",
    "Circinus",
    "Columba",
    "Coma Berenices",
    "Corona Australis",
    "Corona Borealis",
    "Corvus",
    "Crater",
    "Crux",
    "Cygnus",
    "Delphinus",
    "Dorado",
    "Draco",
    "Equuleus",
    "Eridanus",
    "Fornax",
    "Gemini",
    "Grus",
    "Hercules",
    "Horologium",
    "Hydra",
    "Hydrus",
    "Indus",
    "Lacerta",
    "Leo",
    "Leo Minor",
    "Lepus",
    "Libra",
    "Lupus",
    "Lynx",
    "Lyra",
    "Mensa",
    "Microscopium",
    "Monoceros",
    "Musca",
    "Norma",
    "Octans",
    "Ophiuchus",
    "Orion",
    "Pavo",
    "Pegasus",
    "Perseus",
    "Phoenix",
    "Pictor",
    "Pisces",
    "Piscis Austrinus",
    "Puppis",
    "Pyxis",
    "Reticulum",
    "Sagitta",
    "Sagittarius",
    "Scorpius",
    "Sculptor",
    "Scutum",
    "Serpens",
    "Sextans",
    "Taurus",
    "Telescopium",
    "Triangulum",
    "Triangulum Australe",
    "Tucana",
    "Ursa Major",
    "Ursa Minor",
    "Vela",
    "Virgo",
    "Volans",
    "Vulpecula",
];

/// Canonical spelling for `name`, matched case-insensitively
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ");
    CONSTELLATIONS
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(&wanted))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstellationEntry {
    pub name: &'static str,
    pub observed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub observed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn percent(self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.observed as f64 / self.total as f64;
        ratio * 100.0
    }
}

pub struct ConstellationLog {
    store: Arc<dyn PreferenceStore>,
    write_lock: Mutex<()>,
}

impl ConstellationLog {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn observed(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .store
            .load(CONSTELLATIONS_FILE)?
            .get_json::<BTreeSet<String>>(KEY_OBSERVED)
            .unwrap_or_default())
    }

    fn update(&self, name: &str, observed: bool) -> Result<bool> {
        let canonical =
            canonical_name(name).ok_or_else(|| Error::UnknownConstellation(name.trim().into()))?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        let mut prefs = self.store.load(CONSTELLATIONS_FILE)?;
        let mut set = prefs
            .get_json::<BTreeSet<String>>(KEY_OBSERVED)
            .unwrap_or_default();

        let changed = if observed {
            set.insert(canonical.to_string())
        } else {
            set.remove(canonical)
        };
        if changed {
            prefs.put_json(KEY_OBSERVED, &set)?;
            self.store.commit(&prefs)?;
            tracing::debug!("{} marked observed={}", canonical, observed);
        }
        Ok(changed)
    }

    /// Every constellation in catalogue order with its observed flag
    pub fn list(&self) -> Result<Vec<ConstellationEntry>> {
        let observed = self.observed()?;
        Ok(CONSTELLATIONS
            .iter()
            .copied()
            .map(|name| ConstellationEntry {
                name,
                observed: observed.contains(name),
            })
            .collect())
    }

    /// Returns false if it was already observed
    pub fn mark(&self, name: &str) -> Result<bool> {
        self.update(name, true)
    }

    /// Returns false if it was not observed
    pub fn unmark(&self, name: &str) -> Result<bool> {
        self.update(name, false)
    }

    pub fn progress(&self) -> Result<Progress> {
        let observed = self
            .observed()?
            .iter()
            .filter(|name| canonical_name(name).is_some())
            .count();
        Ok(Progress {
            observed,
            total: CONSTELLATIONS.len(),
        })
    }
}
