use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::scenarios::{Harness, Scenario, Trial};
use super::seeds::SeedInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed_label: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester<'a> {
    harness: &'a Harness,
    verbose: bool,
}

impl<'a> LogicTester<'a> {
    pub const fn new(harness: &'a Harness, verbose: bool) -> Self {
        Self { harness, verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &Scenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {})",
                        scenario.key.bright_white(),
                        seed.label()
                    );
                }
                self.run_single_scenario(scenario, seed, iterations)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &Scenario,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();

        for i in 0..iterations {
            let trial = Trial {
                year: seed.year,
                seed: seed
                    .seed
                    .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX)),
            };
            log::debug!("{} iteration {} seed {}", scenario.key, i + 1, trial.seed);
            let start_time = Instant::now();

            match (scenario.check)(self.harness, trial) {
                Ok(detail) => {
                    successes += 1;
                    let duration = start_time.elapsed();
                    performance_data.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) {detail}",
                            i + 1,
                            iterations
                        );
                    }
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (year {}, seed {}): {err:#}",
                        i + 1,
                        trial.year,
                        trial.seed
                    );
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            iterations,
                            message.clone().red()
                        );
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            seed_label: seed.label(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::find_scenario;

    #[test]
    fn iterations_walk_consecutive_seeds() {
        let harness = Harness::load_default();
        let tester = LogicTester::new(&harness, false);
        let scenario = find_scenario("share-codes").unwrap();
        let results = tester.run_scenario(scenario, &[SeedInfo::from_numeric(10)], 3);
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert!(result.passed, "{:?}", result.failures);
        assert_eq!(result.iterations_run, 3);
        assert_eq!(result.successful_iterations, 3);
        assert_eq!(result.performance_data.len(), 3);
    }

    #[test]
    fn failures_are_collected_per_iteration() {
        let mut harness = Harness::load_default();
        harness.teams.truncate(10);
        let tester = LogicTester::new(&harness, false);
        let scenario = find_scenario("schedule").unwrap();
        let results = tester.run_scenario(scenario, &[SeedInfo::from_numeric(1)], 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].failures.len(), 2);
        assert!(results[0].failures[0].starts_with("Iteration 1"));
        assert_eq!(results[0].average_duration, Duration::ZERO);
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "smoke".into(),
            seed_label: "2024-BLITZ42".into(),
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"average_duration\":12"));
        let back: ScenarioResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.performance_data, result.performance_data);
    }
}
