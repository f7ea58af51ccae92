//! Authorization claims embedded in minted tokens
//!
//! A [`TokenClaims`] value is an ordered list of `(claim name, value)` pairs,
//! each flagged as a wildcard component or not. Role constructors build the
//! fixed wildcard sets used by server-side roles; id constructors build the
//! scoped claims handed to low-trust clients.
//!
//! ```rust
//! use fleetauth::{ClaimKind, TokenClaims};
//!
//! let scoped = TokenClaims::trip("trip-42")?;
//! assert!(!scoped.is_wildcard());
//! assert_eq!(scoped.get("tripid"), Some("trip-42"));
//!
//! let any = TokenClaims::any(ClaimKind::Trip);
//! assert!(any.is_wildcard());
//! # Ok::<(), fleetauth::FleetAuthError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FleetAuthError, Result};

/// Claim value standing for "any entity of this kind"
pub const WILDCARD: &str = "*";

/// Entity kinds a token can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    /// Ride-hailing vehicle
    Vehicle,
    /// Ride-hailing trip
    Trip,
    /// Delivery task
    Task,
    /// Shipment tracking id
    Tracking,
    /// Delivery vehicle
    DeliveryVehicle,
}

impl ClaimKind {
    /// Name of the claim inside the `authorization` object
    pub const fn claim_name(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicleid",
            Self::Trip => "tripid",
            Self::Task => "taskid",
            Self::Tracking => "trackingid",
            Self::DeliveryVehicle => "deliveryvehicleid",
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.claim_name())
    }
}

/// A single authorization claim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClaimEntry {
    key: String,
    value: String,
    wildcard: bool,
}

impl ClaimEntry {
    fn wildcard(kind: ClaimKind) -> Self {
        Self {
            key: kind.claim_name().to_string(),
            value: WILDCARD.to_string(),
            wildcard: true,
        }
    }

    /// Claim name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Claim value, either an id or [`WILDCARD`]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this component grants access to every entity of its kind
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }
}

/// Authorization scope of a token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenClaims {
    entries: Vec<ClaimEntry>,
}

impl TokenClaims {
    fn from_kinds(kinds: &[ClaimKind]) -> Self {
        Self {
            entries: kinds.iter().copied().map(ClaimEntry::wildcard).collect(),
        }
    }

    /// Wildcard claims over a single entity kind
    pub fn any(kind: ClaimKind) -> Self {
        Self::from_kinds(&[kind])
    }

    /// Claims scoped to one entity id.
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `id` is absent or empty.
    pub fn scoped(kind: ClaimKind, id: Option<&str>) -> Result<Self> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            Some(_) => {
                return Err(FleetAuthError::invalid_claim(
                    kind.claim_name(),
                    "id must not be empty",
                ));
            }
            None => {
                return Err(FleetAuthError::invalid_claim(
                    kind.claim_name(),
                    "id must have a value",
                ));
            }
        };

        Ok(Self {
            entries: vec![ClaimEntry {
                key: kind.claim_name().to_string(),
                value: id.to_string(),
                wildcard: false,
            }],
        })
    }

    /// Claims scoped to one vehicle
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `vehicle_id` is empty.
    pub fn vehicle(vehicle_id: &str) -> Result<Self> {
        Self::scoped(ClaimKind::Vehicle, Some(vehicle_id))
    }

    /// Claims over every vehicle
    pub fn any_vehicle() -> Self {
        Self::any(ClaimKind::Vehicle)
    }

    /// Claims scoped to one trip
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `trip_id` is empty.
    pub fn trip(trip_id: &str) -> Result<Self> {
        Self::scoped(ClaimKind::Trip, Some(trip_id))
    }

    /// Claims over every trip
    pub fn any_trip() -> Self {
        Self::any(ClaimKind::Trip)
    }

    /// Claims scoped to one delivery task
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `task_id` is empty.
    pub fn task(task_id: &str) -> Result<Self> {
        Self::scoped(ClaimKind::Task, Some(task_id))
    }

    /// Claims over every delivery task
    pub fn any_task() -> Self {
        Self::any(ClaimKind::Task)
    }

    /// Claims scoped to the tasks sharing one tracking id
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `tracking_id` is empty.
    pub fn tracking(tracking_id: &str) -> Result<Self> {
        Self::scoped(ClaimKind::Tracking, Some(tracking_id))
    }

    /// Claims over every tracking id
    pub fn any_tracking() -> Self {
        Self::any(ClaimKind::Tracking)
    }

    /// Claims scoped to one delivery vehicle
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when `delivery_vehicle_id` is empty.
    pub fn delivery_vehicle(delivery_vehicle_id: &str) -> Result<Self> {
        Self::scoped(ClaimKind::DeliveryVehicle, Some(delivery_vehicle_id))
    }

    /// Claims over every delivery vehicle
    pub fn any_delivery_vehicle() -> Self {
        Self::any(ClaimKind::DeliveryVehicle)
    }

    /// Server role: every trip and vehicle
    pub fn server() -> Self {
        Self::from_kinds(&[ClaimKind::Trip, ClaimKind::Vehicle])
    }

    /// Delivery server role: every task, tracking id and delivery vehicle
    pub fn delivery_server() -> Self {
        Self::from_kinds(&[
            ClaimKind::Task,
            ClaimKind::Tracking,
            ClaimKind::DeliveryVehicle,
        ])
    }

    /// Delivery fleet reader role: same reach as the delivery server, read only
    pub fn delivery_fleet_reader() -> Self {
        Self::delivery_server()
    }

    /// Fleet reader role: every id of every kind
    pub fn fleet_reader() -> Self {
        Self::from_kinds(&[
            ClaimKind::Trip,
            ClaimKind::Task,
            ClaimKind::Tracking,
            ClaimKind::Vehicle,
            ClaimKind::DeliveryVehicle,
        ])
    }

    /// Caller-supplied claims for roles outside the standard set.
    ///
    /// A pair whose value is [`WILDCARD`] counts as a wildcard component.
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] for an empty key, an empty
    /// value, or the same key given twice with different values.
    pub fn custom<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut claims = Self {
            entries: Vec::new(),
        };
        for (key, value) in pairs {
            let (key, value) = (key.into(), value.into());
            if key.is_empty() {
                return Err(FleetAuthError::invalid_claim(key, "claim name must not be empty"));
            }
            if value.is_empty() {
                return Err(FleetAuthError::invalid_claim(key, "value must not be empty"));
            }
            let wildcard = value == WILDCARD;
            claims.push(ClaimEntry {
                key,
                value,
                wildcard,
            })?;
        }
        Ok(claims)
    }

    /// Fold several claims into one.
    ///
    /// The result carries the union of the components and is a wildcard only
    /// when every component is.
    ///
    /// # Errors
    ///
    /// Returns [`FleetAuthError::InvalidClaim`] when two inputs assign
    /// different values to the same claim name.
    pub fn merge<I>(claims: I) -> Result<Self>
    where
        I: IntoIterator<Item = TokenClaims>,
    {
        let mut merged = Self {
            entries: Vec::new(),
        };
        for entry in claims.into_iter().flat_map(|c| c.entries) {
            merged.push(entry)?;
        }
        Ok(merged)
    }

    fn push(&mut self, entry: ClaimEntry) -> Result<()> {
        match self.entries.iter().find(|e| e.key == entry.key) {
            Some(existing) if *existing == entry => Ok(()),
            Some(existing) => Err(FleetAuthError::invalid_claim(
                entry.key.clone(),
                format!(
                    "conflicting values '{}' and '{}'",
                    existing.value, entry.value
                ),
            )),
            None => {
                self.entries.push(entry);
                Ok(())
            }
        }
    }

    /// True when every component is a wildcard
    pub fn is_wildcard(&self) -> bool {
        self.entries.iter().all(ClaimEntry::is_wildcard)
    }

    /// Claim name to value mapping, as written into the JWT
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.key.clone(), e.value.clone()))
            .collect()
    }

    /// Components in construction order
    pub fn entries(&self) -> &[ClaimEntry] {
        &self.entries
    }

    /// Value of the named claim
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Whether a component for `kind` is present
    pub fn covers(&self, kind: ClaimKind) -> bool {
        self.get(kind.claim_name()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn any_constructors_are_wildcard() {
        for kind in [
            ClaimKind::Vehicle,
            ClaimKind::Trip,
            ClaimKind::Task,
            ClaimKind::Tracking,
            ClaimKind::DeliveryVehicle,
        ] {
            let claims = TokenClaims::any(kind);
            assert!(claims.is_wildcard(), "{kind} should be wildcard");
            assert_eq!(claims.get(kind.claim_name()), Some(WILDCARD));
        }
    }

    #[test]
    fn scoped_constructors_are_never_wildcard() {
        let claims = TokenClaims::vehicle("v1").unwrap();
        assert!(!claims.is_wildcard());
        assert_eq!(
            claims.to_map(),
            BTreeMap::from([("vehicleid".to_string(), "v1".to_string())])
        );
    }

    #[test]
    fn literal_star_id_is_still_scoped() {
        // Only the `any` constructors produce wildcard components.
        let claims = TokenClaims::trip("*").unwrap();
        assert!(!claims.is_wildcard());
    }

    #[test]
    fn empty_or_absent_ids_are_rejected() {
        assert!(matches!(
            TokenClaims::vehicle(""),
            Err(FleetAuthError::InvalidClaim { .. })
        ));
        assert!(matches!(
            TokenClaims::scoped(ClaimKind::Vehicle, None),
            Err(FleetAuthError::InvalidClaim { .. })
        ));
        assert!(TokenClaims::task("").is_err());
        assert!(TokenClaims::tracking("").is_err());
        assert!(TokenClaims::delivery_vehicle("").is_err());
        assert!(TokenClaims::trip("").is_err());
    }

    #[test]
    fn role_claims_cover_expected_kinds() {
        let server = TokenClaims::server();
        assert!(server.is_wildcard());
        assert_eq!(
            server.to_map().into_keys().collect::<Vec<_>>(),
            vec!["tripid", "vehicleid"]
        );

        let delivery = TokenClaims::delivery_server();
        assert!(delivery.is_wildcard());
        assert!(delivery.covers(ClaimKind::Task));
        assert!(delivery.covers(ClaimKind::Tracking));
        assert!(delivery.covers(ClaimKind::DeliveryVehicle));
        assert!(!delivery.covers(ClaimKind::Trip));

        let reader = TokenClaims::fleet_reader();
        assert!(reader.is_wildcard());
        assert_eq!(reader.entries().len(), 5);
    }

    #[test]
    fn merged_claims_union_maps_and_and_wildcards() {
        let both_any =
            TokenClaims::merge([TokenClaims::any_delivery_vehicle(), TokenClaims::any_task()])
                .unwrap();
        assert!(both_any.is_wildcard());
        assert_eq!(both_any.entries().len(), 2);

        let partial = TokenClaims::merge([
            TokenClaims::delivery_vehicle("dv-1").unwrap(),
            TokenClaims::any_task(),
        ])
        .unwrap();
        assert!(!partial.is_wildcard());
        assert_eq!(
            partial.to_map(),
            BTreeMap::from([
                ("deliveryvehicleid".to_string(), "dv-1".to_string()),
                ("taskid".to_string(), WILDCARD.to_string()),
            ])
        );
    }

    #[test]
    fn merge_rejects_conflicting_values() {
        let result = TokenClaims::merge([
            TokenClaims::task("t-1").unwrap(),
            TokenClaims::task("t-2").unwrap(),
        ]);
        assert!(matches!(result, Err(FleetAuthError::InvalidClaim { .. })));

        let same = TokenClaims::merge([
            TokenClaims::task("t-1").unwrap(),
            TokenClaims::task("t-1").unwrap(),
        ])
        .unwrap();
        assert_eq!(same.entries().len(), 1);
    }

    #[test]
    fn custom_claims_detect_wildcards() {
        let claims = TokenClaims::custom([("region", "*"), ("depot", "*")]).unwrap();
        assert!(claims.is_wildcard());

        let scoped = TokenClaims::custom([("region", "*"), ("depot", "d-9")]).unwrap();
        assert!(!scoped.is_wildcard());

        assert!(TokenClaims::custom([("", "x")]).is_err());
        assert!(TokenClaims::custom([("depot", "")]).is_err());
    }
}
