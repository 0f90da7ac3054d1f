use uuid::Uuid;

use crate::models::{AdditionalProduct, Estimate, LineItem, NoteEntry, Room, RoomEntry};

#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    #[error("Product not found in room: {0}")]
    ProductNotFound(Uuid),

    #[error("Note not found in room: {0}")]
    NoteNotFound(Uuid),

    #[error("Product is already in this room: {0}")]
    DuplicateProduct(Uuid),

    #[error("Room dimensions must be greater than zero")]
    InvalidDimensions,

    #[error("Room already contains a product from a primary category")]
    PrimaryCategoryConflict(Uuid),
}

/// In-tree mutation operations over an estimate. Each function applies one
/// logical change; callers run a full totals pass afterwards and write the
/// whole estimate back as one unit.
pub struct EstimateManager;

impl EstimateManager {
    pub fn add_room(
        estimate: &mut Estimate,
        name: String,
        width: f64,
        length: f64,
    ) -> Result<Uuid, EstimateError> {
        Self::check_dimensions(width, length)?;
        let room = Room::new(name, width, length);
        let room_id = room.id;
        estimate.rooms.push(room);
        estimate.touch();
        Ok(room_id)
    }

    /// Removes the room and everything in it.
    pub fn remove_room(estimate: &mut Estimate, room_id: &Uuid) -> Result<Room, EstimateError> {
        let index = estimate
            .rooms
            .iter()
            .position(|r| r.id == *room_id)
            .ok_or(EstimateError::RoomNotFound(*room_id))?;
        let room = estimate.rooms.remove(index);
        estimate.touch();
        Ok(room)
    }

    pub fn update_room_dimensions(
        estimate: &mut Estimate,
        room_id: &Uuid,
        width: f64,
        length: f64,
    ) -> Result<(), EstimateError> {
        Self::check_dimensions(width, length)?;
        let room = estimate
            .room_mut(room_id)
            .ok_or(EstimateError::RoomNotFound(*room_id))?;
        room.width = width;
        room.length = length;
        estimate.touch();
        Ok(())
    }

    pub fn room_mut<'a>(
        estimate: &'a mut Estimate,
        room_id: &Uuid,
    ) -> Result<&'a mut Room, EstimateError> {
        estimate
            .room_mut(room_id)
            .ok_or(EstimateError::RoomNotFound(*room_id))
    }

    /// Append a product to the room. Rejects a second non-note item with
    /// the same catalog id, and a second primary-category product when the
    /// flag check is on.
    pub fn add_product(
        room: &mut Room,
        item: LineItem,
        enforce_primary: bool,
    ) -> Result<(), EstimateError> {
        if room.contains_product(&item.id) {
            return Err(EstimateError::DuplicateProduct(item.id));
        }
        if enforce_primary
            && item.is_primary_category
            && room.line_items().any(|existing| existing.is_primary_category)
        {
            return Err(EstimateError::PrimaryCategoryConflict(item.id));
        }
        room.entries.push(RoomEntry::Product(item));
        Ok(())
    }

    pub fn add_note(room: &mut Room, note_text: String) -> Uuid {
        let note = NoteEntry::new(note_text);
        let note_id = note.id;
        room.entries.push(RoomEntry::Note(note));
        note_id
    }

    /// Remove a product by catalog id. Lookup is by id, never by position:
    /// positional indices are not stable across concurrent mutations.
    pub fn remove_product(room: &mut Room, product_id: &Uuid) -> Result<LineItem, EstimateError> {
        let index = room
            .entries
            .iter()
            .position(|entry| entry.as_product().is_some_and(|item| item.id == *product_id))
            .ok_or(EstimateError::ProductNotFound(*product_id))?;
        match room.entries.remove(index) {
            RoomEntry::Product(item) => Ok(item),
            RoomEntry::Note(note) => {
                // The position matched a product; a note here is impossible,
                // but restore it rather than lose data.
                room.entries.insert(index, RoomEntry::Note(note));
                Err(EstimateError::ProductNotFound(*product_id))
            }
        }
    }

    pub fn remove_note(room: &mut Room, note_id: &Uuid) -> Result<(), EstimateError> {
        let index = room
            .entries
            .iter()
            .position(|entry| matches!(entry, RoomEntry::Note(note) if note.id == *note_id))
            .ok_or(EstimateError::NoteNotFound(*note_id))?;
        room.entries.remove(index);
        Ok(())
    }

    pub fn product_mut<'a>(
        room: &'a mut Room,
        product_id: &Uuid,
    ) -> Result<&'a mut LineItem, EstimateError> {
        room.line_items_mut()
            .find(|item| item.id == *product_id)
            .ok_or(EstimateError::ProductNotFound(*product_id))
    }

    /// Locate a companion slot under a given main item.
    pub fn companion_slot_mut<'a>(
        room: &'a mut Room,
        parent_product_id: &Uuid,
        slot_product_id: &Uuid,
    ) -> Result<&'a mut AdditionalProduct, EstimateError> {
        let parent = Self::product_mut(room, parent_product_id)?;
        parent
            .additional_products
            .iter_mut()
            .find(|extra| extra.id == *slot_product_id)
            .ok_or(EstimateError::ProductNotFound(*slot_product_id))
    }

    fn check_dimensions(width: f64, length: f64) -> Result<(), EstimateError> {
        // NaN fails both comparisons.
        if width > 0.0 && length > 0.0 {
            Ok(())
        } else {
            Err(EstimateError::InvalidDimensions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomquote_catalog::PricingMethod;

    fn item(id: Uuid, is_primary: bool) -> LineItem {
        LineItem {
            id,
            name: "Test product".to_string(),
            image_url: None,
            pricing_method: PricingMethod::Fixed,
            pricing_source: "website".to_string(),
            min_price: 10.0,
            max_price: 20.0,
            min_price_total: 10.0,
            max_price_total: 20.0,
            is_primary_category: is_primary,
            is_variable: false,
            variations: Vec::new(),
            additional_products: Vec::new(),
            additional_notes: Vec::new(),
        }
    }

    #[test]
    fn add_room_rejects_bad_dimensions() {
        let mut estimate = Estimate::new("est-1".to_string(), "Test".to_string());

        assert!(matches!(
            EstimateManager::add_room(&mut estimate, "Lounge".to_string(), 0.0, 4.0),
            Err(EstimateError::InvalidDimensions)
        ));
        assert!(matches!(
            EstimateManager::add_room(&mut estimate, "Lounge".to_string(), 3.0, -1.0),
            Err(EstimateError::InvalidDimensions)
        ));
        assert!(matches!(
            EstimateManager::add_room(&mut estimate, "Lounge".to_string(), f64::NAN, 4.0),
            Err(EstimateError::InvalidDimensions)
        ));
        assert!(estimate.rooms.is_empty());
    }

    #[test]
    fn duplicate_product_is_rejected_and_room_keeps_one() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        let product_id = Uuid::new_v4();

        EstimateManager::add_product(&mut room, item(product_id, false), true).unwrap();
        let second = EstimateManager::add_product(&mut room, item(product_id, false), true);

        assert!(matches!(
            second,
            Err(EstimateError::DuplicateProduct(id)) if id == product_id
        ));
        assert_eq!(room.line_items().filter(|i| i.id == product_id).count(), 1);
    }

    #[test]
    fn second_primary_category_product_conflicts() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        EstimateManager::add_product(&mut room, item(Uuid::new_v4(), true), true).unwrap();

        let conflicting = Uuid::new_v4();
        assert!(matches!(
            EstimateManager::add_product(&mut room, item(conflicting, true), true),
            Err(EstimateError::PrimaryCategoryConflict(id)) if id == conflicting
        ));

        // Non-primary products still coexist, and the check can be disabled.
        EstimateManager::add_product(&mut room, item(Uuid::new_v4(), false), true).unwrap();
        EstimateManager::add_product(&mut room, item(Uuid::new_v4(), true), false).unwrap();
    }

    #[test]
    fn remove_product_is_id_based() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        EstimateManager::add_product(&mut room, item(first, false), true).unwrap();
        EstimateManager::add_product(&mut room, item(second, false), true).unwrap();

        let removed = EstimateManager::remove_product(&mut room, &first).unwrap();
        assert_eq!(removed.id, first);
        assert!(room.contains_product(&second));
        assert!(!room.contains_product(&first));

        assert!(matches!(
            EstimateManager::remove_product(&mut room, &first),
            Err(EstimateError::ProductNotFound(_))
        ));
    }

    #[test]
    fn removing_last_product_keeps_the_room() {
        let mut estimate = Estimate::new("est-1".to_string(), "Test".to_string());
        let room_id =
            EstimateManager::add_room(&mut estimate, "Lounge".to_string(), 3.0, 4.0).unwrap();
        let product_id = Uuid::new_v4();

        let room = EstimateManager::room_mut(&mut estimate, &room_id).unwrap();
        EstimateManager::add_product(room, item(product_id, false), true).unwrap();
        EstimateManager::remove_product(room, &product_id).unwrap();

        assert!(estimate.room(&room_id).is_some());
    }

    #[test]
    fn remove_room_cascades() {
        let mut estimate = Estimate::new("est-1".to_string(), "Test".to_string());
        let room_id =
            EstimateManager::add_room(&mut estimate, "Lounge".to_string(), 3.0, 4.0).unwrap();
        let room = EstimateManager::room_mut(&mut estimate, &room_id).unwrap();
        EstimateManager::add_product(room, item(Uuid::new_v4(), false), true).unwrap();

        let removed = EstimateManager::remove_room(&mut estimate, &room_id).unwrap();
        assert_eq!(removed.line_items().count(), 1);
        assert!(estimate.rooms.is_empty());
    }

    #[test]
    fn notes_do_not_collide_with_products() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        let product_id = Uuid::new_v4();
        EstimateManager::add_product(&mut room, item(product_id, false), true).unwrap();
        let note_id = EstimateManager::add_note(&mut room, "Check subfloor".to_string());

        assert_eq!(room.entries.len(), 2);
        EstimateManager::remove_note(&mut room, &note_id).unwrap();
        assert!(room.contains_product(&product_id));
    }

    #[test]
    fn companion_slot_lookup() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        let parent_id = Uuid::new_v4();
        let companion_id = Uuid::new_v4();
        let mut parent = item(parent_id, false);
        parent.additional_products.push(AdditionalProduct {
            id: companion_id,
            name: "Underlay".to_string(),
            image_url: None,
            pricing_method: None,
            pricing_source: None,
            min_price: 2.0,
            max_price: 4.0,
            min_price_total: 2.0,
            max_price_total: 4.0,
            replacement_chain: Vec::new(),
            section_title: None,
            section_description: None,
            option_colours: Vec::new(),
        });
        EstimateManager::add_product(&mut room, parent, true).unwrap();

        assert!(EstimateManager::companion_slot_mut(&mut room, &parent_id, &companion_id).is_ok());
        assert!(matches!(
            EstimateManager::companion_slot_mut(&mut room, &parent_id, &Uuid::new_v4()),
            Err(EstimateError::ProductNotFound(_))
        ));
        assert!(matches!(
            EstimateManager::companion_slot_mut(&mut room, &Uuid::new_v4(), &companion_id),
            Err(EstimateError::ProductNotFound(_))
        ));
    }
}
