use serde::Serialize;

use crate::config::ConfigError;

/// Snapshot of a battery's parameters and stored energy.
///
/// Handed out by [`Battery::state`]; the battery itself is the only owner
/// allowed to change `stored_kwh`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryState {
    /// Usable energy capacity in kilowatt-hours.
    pub capacity_kwh: f32,
    /// Energy that must always stay in storage (kWh).
    pub min_reserve_kwh: f32,
    /// Charging efficiency in (0, 1].
    pub eta_charge: f32,
    /// Discharging efficiency in (0, 1].
    pub eta_discharge: f32,
    /// Currently stored energy (kWh).
    pub stored_kwh: f32,
}

impl BatteryState {
    /// Stored energy as a fraction of capacity (0.0 to 1.0).
    pub fn soc(&self) -> f32 {
        self.stored_kwh / self.capacity_kwh
    }
}

/// A battery energy storage system working in energy-per-step units.
///
/// `Battery` keeps `min_reserve_kwh <= stored_kwh <= capacity_kwh` after every
/// call. Efficiency losses are taken on the way in (`charge`) and on the way
/// out (`discharge`); over-requests are clamped, never rejected.
///
/// Energy is stored as `f32`. With both efficiencies at 1.0, `charge(x)`
/// followed by `discharge(x)` restores `stored_kwh` to within one rounding
/// step of the larger value involved, which stays under 1e-4 kWh for
/// capacities up to 1000 kWh.
///
/// # Examples
///
/// ```
/// use solar_bess_sim::devices::Battery;
///
/// let mut battery = Battery::new(100.0, 10.0, 10.0, 1.0, 1.0).unwrap();
/// assert_eq!(battery.charge(30.0), 30.0);
/// assert_eq!(battery.discharge(30.0), 30.0);
/// assert_eq!(battery.stored_kwh(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct Battery {
    capacity_kwh: f32,
    min_reserve_kwh: f32,
    eta_c: f32,
    eta_d: f32,
    stored_kwh: f32,
}

impl Battery {
    /// Creates a new battery.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Battery capacity in kWh (must be > 0)
    /// * `min_reserve_kwh` - Mandatory reserve, in `[0, capacity_kwh)`
    /// * `initial_kwh` - Stored energy at start, in `[min_reserve_kwh, capacity_kwh]`
    /// * `eta_c` - Charging efficiency in (0, 1]
    /// * `eta_d` - Discharging efficiency in (0, 1]
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first parameter that is out of range.
    pub fn new(
        capacity_kwh: f32,
        min_reserve_kwh: f32,
        initial_kwh: f32,
        eta_c: f32,
        eta_d: f32,
    ) -> Result<Self, ConfigError> {
        if !(capacity_kwh.is_finite() && capacity_kwh > 0.0) {
            return Err(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(min_reserve_kwh >= 0.0 && min_reserve_kwh < capacity_kwh) {
            return Err(ConfigError::new(
                "battery.min_reserve_kwh",
                "must be in [0, battery.capacity_kwh)",
            ));
        }
        if !(initial_kwh >= min_reserve_kwh && initial_kwh <= capacity_kwh) {
            return Err(ConfigError::new(
                "battery.initial_kwh",
                "must be in [battery.min_reserve_kwh, battery.capacity_kwh]",
            ));
        }
        if !(eta_c > 0.0 && eta_c <= 1.0) {
            return Err(ConfigError::new("battery.eta_charge", "must be in (0.0, 1.0]"));
        }
        if !(eta_d > 0.0 && eta_d <= 1.0) {
            return Err(ConfigError::new(
                "battery.eta_discharge",
                "must be in (0.0, 1.0]",
            ));
        }

        Ok(Self {
            capacity_kwh,
            min_reserve_kwh,
            eta_c,
            eta_d,
            stored_kwh: initial_kwh,
        })
    }

    /// Absorbs up to `requested_kwh` from the source side.
    ///
    /// Returns the energy actually drawn from the source, including the part
    /// lost to charging inefficiency. Only `actual * eta_c` ends up stored.
    /// Non-positive requests leave the battery untouched and return 0.
    pub fn charge(&mut self, requested_kwh: f32) -> f32 {
        if !(requested_kwh > 0.0) {
            return 0.0;
        }

        let room_kwh = (self.capacity_kwh - self.stored_kwh).max(0.0);
        let max_input_kwh = room_kwh / self.eta_c;

        if requested_kwh >= max_input_kwh {
            // Full: land exactly on capacity instead of accumulating rounding.
            self.stored_kwh = self.capacity_kwh;
            return max_input_kwh;
        }

        self.stored_kwh += requested_kwh * self.eta_c;
        self.enforce_bounds();
        requested_kwh
    }

    /// Delivers up to `requested_kwh` to the grid side.
    ///
    /// Returns the energy actually delivered. Storage drops by
    /// `actual / eta_d` and never goes below the reserve.
    /// Non-positive requests leave the battery untouched and return 0.
    pub fn discharge(&mut self, requested_kwh: f32) -> f32 {
        if !(requested_kwh > 0.0) {
            return 0.0;
        }

        let available_kwh = (self.stored_kwh - self.min_reserve_kwh).max(0.0);
        let max_output_kwh = available_kwh * self.eta_d;

        if requested_kwh >= max_output_kwh {
            self.stored_kwh = self.min_reserve_kwh;
            return max_output_kwh;
        }

        self.stored_kwh -= requested_kwh / self.eta_d;
        self.enforce_bounds();
        requested_kwh
    }

    /// Guards the storage invariant against floating-point drift.
    fn enforce_bounds(&mut self) {
        self.stored_kwh = self
            .stored_kwh
            .clamp(self.min_reserve_kwh, self.capacity_kwh);
    }

    /// Currently stored energy (kWh).
    pub fn stored_kwh(&self) -> f32 {
        self.stored_kwh
    }

    /// Battery capacity (kWh).
    pub fn capacity_kwh(&self) -> f32 {
        self.capacity_kwh
    }

    /// Mandatory minimum reserve (kWh).
    pub fn min_reserve_kwh(&self) -> f32 {
        self.min_reserve_kwh
    }

    /// Charging efficiency.
    pub fn eta_charge(&self) -> f32 {
        self.eta_c
    }

    /// Discharging efficiency.
    pub fn eta_discharge(&self) -> f32 {
        self.eta_d
    }

    /// State of charge as a fraction of capacity (0.0 to 1.0).
    pub fn soc(&self) -> f32 {
        self.stored_kwh / self.capacity_kwh
    }

    /// Returns a copy of the current battery state.
    pub fn state(&self) -> BatteryState {
        BatteryState {
            capacity_kwh: self.capacity_kwh,
            min_reserve_kwh: self.min_reserve_kwh,
            eta_charge: self.eta_c,
            eta_discharge: self.eta_d,
            stored_kwh: self.stored_kwh,
        }
    }
}
