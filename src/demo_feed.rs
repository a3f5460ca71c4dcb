use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use rand::Rng;

use crate::class::resolve_class;

const DEMO_HEADER: [&str; 11] = [
    "Team", "Driver", "Class", "Pos", "Class Pos", "Laps", "Pits", "Avg Lap", "Best Lap",
    "Last Lap", "In Pit",
];
const PACE_CAR: [&str; 11] = ["Safety", "Pace Car", "GT3", "0", "0", "0", "0", "", "", "", "False"];
const PIT_LOSS_SECS: f64 = 35.0;

#[derive(Debug, Clone)]
struct DemoCar {
    team: &'static str,
    driver: &'static str,
    class: &'static str,
    base_lap: f64,
    laps: u32,
    race_time: f64,
    best: Option<f64>,
    last: Option<f64>,
    pits: u32,
    in_pit: bool,
}

impl DemoCar {
    fn new(team: &'static str, driver: &'static str, class: &'static str, base_lap: f64) -> Self {
        Self {
            team,
            driver,
            class,
            base_lap,
            laps: 0,
            race_time: 0.0,
            best: None,
            last: None,
            pits: 0,
            in_pit: false,
        }
    }

    fn advance(&mut self, rng: &mut impl Rng) {
        let mut lap = self.base_lap + rng.gen_range(-1.5..2.5);
        if self.in_pit {
            self.in_pit = rng.gen_bool(0.3);
        } else if self.laps > 2 && rng.gen_bool(0.04) {
            self.in_pit = true;
            self.pits += 1;
            lap += PIT_LOSS_SECS;
        }
        self.laps += 1;
        self.race_time += lap;
        self.last = Some(lap);
        self.best = Some(self.best.map_or(lap, |best| best.min(lap)));
    }

    fn avg_lap(&self) -> Option<f64> {
        (self.laps > 0).then(|| self.race_time / f64::from(self.laps))
    }
}

/// Synthetic three-class race used when no live feed is available. Every
/// call to [`DemoFeed::next_csv`] advances each car by one lap.
#[derive(Debug, Clone)]
pub struct DemoFeed {
    cars: Vec<DemoCar>,
}

impl Default for DemoFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoFeed {
    pub fn new() -> Self {
        Self {
            cars: vec![
                DemoCar::new("Apex Works", "R. Lindqvist", "Hypercar", 208.0),
                DemoCar::new("Nordlicht", "M. Ferraz", "Hypercar", 208.6),
                DemoCar::new("Team Kestrel", "J. Okafor", "Class 4074", 209.1),
                DemoCar::new("Velocita", "S. Marchetti", "P2", 216.4),
                DemoCar::new("Blue Horizon", "A. Novak", "Class 2523", 216.9),
                DemoCar::new("Redline GT", "T. Hughes", "GT3", 231.5),
                DemoCar::new("Ironbark", "L. Chen", "GT3", 231.9),
                DemoCar::new("Old Guard", "P. Duval", "Class 2708", 232.4),
            ],
        }
    }

    pub fn next_csv(&mut self) -> Result<String> {
        let mut rng = rand::thread_rng();
        for car in &mut self.cars {
            car.advance(&mut rng);
        }
        self.to_csv()
    }

    fn to_csv(&self) -> Result<String> {
        let mut order: Vec<usize> = (0..self.cars.len()).collect();
        order.sort_by(|&a, &b| {
            let (ca, cb) = (&self.cars[a], &self.cars[b]);
            cb.laps
                .cmp(&ca.laps)
                .then(ca.race_time.total_cmp(&cb.race_time))
        });

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(DEMO_HEADER)?;
        let mut class_counts: HashMap<String, u32> = HashMap::new();
        for (rank, idx) in order.into_iter().enumerate() {
            let car = &self.cars[idx];
            let class_pos = class_counts
                .entry(resolve_class(car.class).display_name)
                .or_insert(0);
            *class_pos += 1;
            writer.write_record([
                car.team.to_string(),
                car.driver.to_string(),
                car.class.to_string(),
                (rank + 1).to_string(),
                class_pos.to_string(),
                car.laps.to_string(),
                car.pits.to_string(),
                fmt_time(car.avg_lap()),
                fmt_time(car.best),
                fmt_time(car.last),
                if car.in_pit { "True" } else { "False" }.to_string(),
            ])?;
        }
        writer.write_record(PACE_CAR)?;

        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow!("flushing demo feed: {}", err.error()))?;
        String::from_utf8(bytes).context("demo feed is not utf-8")
    }
}

fn fmt_time(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}
