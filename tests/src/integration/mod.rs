//! # Integration Scenarios

pub mod fixtures;

#[cfg(test)]
mod flows;
#[cfg(test)]
mod listener;
#[cfg(test)]
mod signed_states;
