//! Cross-module scenarios driving actors through a live simulation

mod actor_scenarios;
