//! Live game state read by the recruitment AI
//!
//! The board owns the map, every unit on it, the sides with their gold and
//! recall lists, village ownership and the day schedule. Every mutation bumps
//! `gamestate_version` so callers can notice that something ran behind their
//! back.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::board::side::Side;
use crate::board::time_of_day::{default_schedule, TimeOfDay};
use crate::core::error::{RecruitError, Result};
use crate::core::types::{Gold, SideId, Turn, UnitId};
use crate::map::{GameMap, Location};
use crate::units::{Unit, UnitType};

#[derive(Debug, Clone)]
pub struct GameBoard {
    map: GameMap,
    units: Vec<Unit>,
    sides: BTreeMap<SideId, Side>,
    village_owners: BTreeMap<Location, SideId>,
    turn: Turn,
    schedule: Vec<TimeOfDay>,
    next_unit_id: u32,
    gamestate_version: u64,
}

impl GameBoard {
    pub fn new(map: GameMap) -> Self {
        Self {
            map,
            units: Vec::new(),
            sides: BTreeMap::new(),
            village_owners: BTreeMap::new(),
            turn: 1,
            schedule: default_schedule(),
            next_unit_id: 1,
            gamestate_version: 0,
        }
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
        self.bump();
    }

    pub fn schedule(&self) -> &[TimeOfDay] {
        &self.schedule
    }

    pub fn set_schedule(&mut self, schedule: Vec<TimeOfDay>) {
        self.schedule = schedule;
        self.bump();
    }

    /// Incremented by every state change
    pub fn gamestate_version(&self) -> u64 {
        self.gamestate_version
    }

    fn bump(&mut self) {
        self.gamestate_version += 1;
    }

    // --- sides ---

    pub fn add_side(&mut self, side: Side) -> Result<()> {
        if self.sides.contains_key(&side.id) {
            return Err(RecruitError::InvalidConfig(format!("{} added twice", side.id)));
        }
        self.sides.insert(side.id, side);
        self.bump();
        Ok(())
    }

    pub fn side(&self, id: SideId) -> Option<&Side> {
        self.sides.get(&id)
    }

    /// Mutable access to a side. Counts as a state change.
    pub fn side_mut(&mut self, id: SideId) -> Option<&mut Side> {
        if self.sides.contains_key(&id) {
            self.bump();
        }
        self.sides.get_mut(&id)
    }

    pub fn sides(&self) -> impl Iterator<Item = &Side> {
        self.sides.values()
    }

    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    /// Sides on different teams are enemies; unknown sides are nobody's enemy
    pub fn is_enemy(&self, a: SideId, b: SideId) -> bool {
        match (self.sides.get(&a), self.sides.get(&b)) {
            (Some(a), Some(b)) => a.is_enemy(b),
            _ => false,
        }
    }

    pub fn spend_gold(&mut self, side: SideId, amount: Gold) -> Result<()> {
        let entry = self.sides.get_mut(&side).ok_or(RecruitError::UnknownSide(side))?;
        entry.gold -= amount;
        self.bump();
        Ok(())
    }

    // --- units ---

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        let index = self.units.iter().position(|u| u.id == id)?;
        self.bump();
        Some(&mut self.units[index])
    }

    pub fn unit_at(&self, loc: Location) -> Option<&Unit> {
        self.units.iter().find(|u| u.location == loc)
    }

    pub fn is_occupied(&self, loc: Location) -> bool {
        self.unit_at(loc).is_some()
    }

    pub fn units_of(&self, side: SideId) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.side == side)
    }

    pub fn leaders_of(&self, side: SideId) -> impl Iterator<Item = &Unit> {
        self.units_of(side).filter(|u| u.can_recruit)
    }

    /// Hand out an id for a unit that is not on the board yet
    pub fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    fn insert_unit(&mut self, mut unit: Unit) -> Result<UnitId> {
        if !self.map.on_board(unit.location) {
            return Err(RecruitError::InvalidLocation(unit.location));
        }
        if self.is_occupied(unit.location) {
            return Err(RecruitError::Occupied(unit.location));
        }
        if !self.sides.contains_key(&unit.side) {
            return Err(RecruitError::UnknownSide(unit.side));
        }
        unit.id = self.allocate_unit_id();
        let id = unit.id;
        self.units.push(unit);
        Ok(id)
    }

    /// Place a unit. Its id is replaced by a fresh one.
    pub fn place_unit(&mut self, unit: Unit) -> Result<UnitId> {
        let id = self.insert_unit(unit)?;
        self.bump();
        Ok(id)
    }

    /// Pay `price` and create a unit of `unit_type`. One state change.
    pub fn recruit_unit(&mut self, unit_type: &UnitType, side: SideId, loc: Location, price: Gold) -> Result<UnitId> {
        let id = self.insert_unit(Unit::from_type(UnitId(0), unit_type, side, loc))?;
        if let Some(entry) = self.sides.get_mut(&side) {
            entry.gold -= price;
        }
        self.bump();
        Ok(id)
    }

    /// Create a fresh unit of the given type on the board
    pub fn spawn_unit(&mut self, unit_type: &UnitType, side: SideId, loc: Location) -> Result<UnitId> {
        let unit = Unit::from_type(UnitId(0), unit_type, side, loc);
        self.place_unit(unit)
    }

    /// Create a leader on the board
    pub fn spawn_leader(&mut self, unit_type: &UnitType, side: SideId, loc: Location, name: &str) -> Result<UnitId> {
        let unit = Unit::from_type(UnitId(0), unit_type, side, loc)
            .with_name(name)
            .as_leader();
        self.place_unit(unit)
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|u| u.id == id)?;
        self.bump();
        Some(self.units.remove(index))
    }

    /// Put a unit on a side's recall list
    pub fn add_to_recall_list(&mut self, side: SideId, mut unit: Unit) -> Result<UnitId> {
        if !self.sides.contains_key(&side) {
            return Err(RecruitError::UnknownSide(side));
        }
        unit.id = self.allocate_unit_id();
        unit.side = side;
        unit.location = Location::NULL;
        let id = unit.id;
        if let Some(entry) = self.sides.get_mut(&side) {
            entry.recall_list.push(unit);
        }
        self.bump();
        Ok(id)
    }

    /// Pay `price` and move a unit from its side's recall list onto the map.
    /// One state change.
    pub fn recall_unit(&mut self, side: SideId, id: UnitId, loc: Location, price: Gold) -> Result<()> {
        if self.is_occupied(loc) {
            return Err(RecruitError::Occupied(loc));
        }
        if !self.map.on_board(loc) {
            return Err(RecruitError::InvalidLocation(loc));
        }
        let entry = self.sides.get_mut(&side).ok_or(RecruitError::UnknownSide(side))?;
        let index = entry
            .recall_list
            .iter()
            .position(|u| u.id == id)
            .ok_or(RecruitError::UnitNotFound(id))?;
        let mut unit = entry.recall_list.remove(index);
        entry.gold -= price;
        unit.location = loc;
        self.units.push(unit);
        self.bump();
        Ok(())
    }

    // --- villages ---

    pub fn village_owner(&self, loc: Location) -> Option<SideId> {
        self.village_owners.get(&loc).copied()
    }

    pub fn set_village_owner(&mut self, loc: Location, owner: Option<SideId>) -> Result<()> {
        if !self.map.is_village(loc) {
            return Err(RecruitError::InvalidLocation(loc));
        }
        match owner {
            Some(side) => {
                self.village_owners.insert(loc, side);
            }
            None => {
                self.village_owners.remove(&loc);
            }
        }
        self.bump();
        Ok(())
    }

    pub fn village_count(&self, side: SideId) -> usize {
        self.village_owners.values().filter(|owner| **owner == side).count()
    }

    pub fn neutral_village_count(&self) -> usize {
        self.map
            .villages()
            .filter(|loc| !self.village_owners.contains_key(loc))
            .count()
    }

    // --- castles ---

    /// Castle hexes connected to the keep at `keep`, in BFS order
    pub fn connected_castle(&self, keep: Location) -> Vec<Location> {
        if !self.map.is_keep(keep) {
            return Vec::new();
        }
        let mut seen = BTreeSet::from([keep]);
        let mut queue = VecDeque::from([keep]);
        let mut castle = Vec::new();
        while let Some(loc) = queue.pop_front() {
            castle.push(loc);
            for next in self.map.adjacent_on_board(loc) {
                if self.map.is_castle(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        castle
    }

    /// First unoccupied castle hex connected to the keep at `keep`
    pub fn find_vacant_castle(&self, keep: Location) -> Option<Location> {
        self.connected_castle(keep)
            .into_iter()
            .find(|loc| !self.is_occupied(*loc))
    }

    pub fn vacant_castle_count(&self, keep: Location) -> usize {
        self.connected_castle(keep)
            .into_iter()
            .filter(|loc| !self.is_occupied(*loc))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TeamId;

    fn board() -> GameBoard {
        let map = GameMap::from_ascii(
            "
            . C . v
            C K . .
            . . C v
            ",
        )
        .unwrap();
        let mut board = GameBoard::new(map);
        board.add_side(Side::new(SideId(1), TeamId(1), 100)).unwrap();
        board.add_side(Side::new(SideId(2), TeamId(2), 100)).unwrap();
        board
    }

    #[test]
    fn test_connected_castle() {
        let board = board();
        let castle = board.connected_castle(Location::new(1, 1));
        assert_eq!(castle[0], Location::new(1, 1));
        assert_eq!(castle.len(), 4);
        assert!(castle.contains(&Location::new(2, 2)));
        assert!(board.connected_castle(Location::new(0, 1)).is_empty());
    }

    #[test]
    fn test_vacant_castle_skips_occupied() {
        let mut board = board();
        let unit_type = UnitType::new("Spearman", 14, 36, 5);
        let keep = Location::new(1, 1);
        board.spawn_leader(&unit_type, SideId(1), keep, "Leader").unwrap();
        assert_eq!(board.vacant_castle_count(keep), 3);

        let first = board.find_vacant_castle(keep).unwrap();
        board.spawn_unit(&unit_type, SideId(1), first).unwrap();
        assert_eq!(board.vacant_castle_count(keep), 2);
        assert_ne!(board.find_vacant_castle(keep), Some(first));
    }

    #[test]
    fn test_place_unit_errors() {
        let mut board = board();
        let unit_type = UnitType::new("Spearman", 14, 36, 5);
        board.spawn_unit(&unit_type, SideId(1), Location::new(0, 0)).unwrap();
        assert!(matches!(
            board.spawn_unit(&unit_type, SideId(1), Location::new(0, 0)),
            Err(RecruitError::Occupied(_))
        ));
        assert!(matches!(
            board.spawn_unit(&unit_type, SideId(1), Location::new(9, 9)),
            Err(RecruitError::InvalidLocation(_))
        ));
        assert!(matches!(
            board.spawn_unit(&unit_type, SideId(7), Location::new(2, 0)),
            Err(RecruitError::UnknownSide(_))
        ));
    }

    #[test]
    fn test_mutations_bump_version() {
        let mut board = board();
        let before = board.gamestate_version();
        board.spend_gold(SideId(1), 14).unwrap();
        assert_eq!(board.gamestate_version(), before + 1);
        assert_eq!(board.side(SideId(1)).unwrap().gold, 86);
    }

    #[test]
    fn test_recruit_is_one_state_change() {
        let mut board = board();
        let unit_type = UnitType::new("Spearman", 14, 36, 5);
        let before = board.gamestate_version();
        board.recruit_unit(&unit_type, SideId(1), Location::new(0, 1), 14).unwrap();
        assert_eq!(board.gamestate_version(), before + 1);
        assert_eq!(board.side(SideId(1)).unwrap().gold, 86);

        // a failed placement costs nothing
        assert!(board.recruit_unit(&unit_type, SideId(1), Location::new(0, 1), 14).is_err());
        assert_eq!(board.side(SideId(1)).unwrap().gold, 86);
    }

    #[test]
    fn test_villages() {
        let mut board = board();
        assert_eq!(board.neutral_village_count(), 2);
        board.set_village_owner(Location::new(3, 0), Some(SideId(1))).unwrap();
        assert_eq!(board.neutral_village_count(), 1);
        assert_eq!(board.village_count(SideId(1)), 1);
        assert!(board.set_village_owner(Location::new(0, 0), Some(SideId(1))).is_err());
    }

    #[test]
    fn test_recall_list() {
        let mut board = board();
        let unit_type = UnitType::new("Archer", 14, 29, 5);
        let veteran = Unit::from_type(UnitId(0), &unit_type, SideId(1), Location::NULL);
        let id = board.add_to_recall_list(SideId(1), veteran).unwrap();
        assert_eq!(board.side(SideId(1)).unwrap().recall_list.len(), 1);

        let before = board.gamestate_version();
        board.recall_unit(SideId(1), id, Location::new(0, 1), 20).unwrap();
        assert_eq!(board.gamestate_version(), before + 1);
        assert_eq!(board.side(SideId(1)).unwrap().gold, 80);
        assert!(board.side(SideId(1)).unwrap().recall_list.is_empty());
        assert_eq!(board.unit_at(Location::new(0, 1)).map(|u| u.id), Some(id));
    }

    #[test]
    fn test_enemies() {
        let board = board();
        assert!(board.is_enemy(SideId(1), SideId(2)));
        assert!(!board.is_enemy(SideId(1), SideId(1)));
        assert!(!board.is_enemy(SideId(1), SideId(9)));
    }
}
