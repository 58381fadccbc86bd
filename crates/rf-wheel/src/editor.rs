//! Partition editor
//!
//! Edits happen on a draft copy; nothing reaches the live wheel until
//! [`PartitionEditor::commit`]. Dropping the editor discards the draft.

use rf_core::{ColorToken, MIN_PARTITIONS, Partition, RfError, RfResult};

/// Label given to freshly added partitions
pub const NEW_PARTITION_LABEL: &str = "New";
const NEW_PARTITION_ICON: &str = "✨";
const NEW_PARTITION_DESCRIPTION: &str = "Rule for the new partition";

/// Draft editor over a partition list
#[derive(Debug, Clone)]
pub struct PartitionEditor {
    draft: Vec<Partition>,
    min_partitions: usize,
}

impl PartitionEditor {
    /// Start editing a copy of `partitions`
    pub fn new(partitions: &[Partition]) -> Self {
        Self {
            draft: partitions.to_vec(),
            min_partitions: MIN_PARTITIONS,
        }
    }

    /// Override the removal floor
    pub fn with_minimum(mut self, min_partitions: usize) -> Self {
        self.min_partitions = min_partitions;
        self
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.draft
    }

    pub fn len(&self) -> usize {
        self.draft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    pub fn min_partitions(&self) -> usize {
        self.min_partitions
    }

    /// Whether a removal would currently be accepted
    pub fn can_remove(&self) -> bool {
        self.draft.len() > self.min_partitions
    }

    fn find_mut(&mut self, id: &str) -> RfResult<&mut Partition> {
        self.draft
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RfError::UnknownPartition(id.to_string()))
    }

    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> RfResult<()> {
        self.find_mut(id)?.label = label.into();
        Ok(())
    }

    /// Set or clear (empty string) the icon
    pub fn set_icon(&mut self, id: &str, icon: impl Into<String>) -> RfResult<()> {
        let icon = icon.into();
        self.find_mut(id)?.icon = (!icon.is_empty()).then_some(icon);
        Ok(())
    }

    /// Set or clear (empty string) the description
    pub fn set_description(&mut self, id: &str, description: impl Into<String>) -> RfResult<()> {
        let description = description.into();
        self.find_mut(id)?.description = (!description.is_empty()).then_some(description);
        Ok(())
    }

    pub fn set_color(&mut self, id: &str, color: ColorToken) -> RfResult<()> {
        self.find_mut(id)?.color = color;
        Ok(())
    }

    /// Append a placeholder partition. Its color cycles through the palette
    /// by the current count.
    pub fn add(&mut self) -> &Partition {
        let partition = Partition::new(
            uuid::Uuid::new_v4().to_string(),
            NEW_PARTITION_LABEL,
            ColorToken::cycled(self.draft.len()),
        )
        .with_icon(NEW_PARTITION_ICON)
        .with_description(NEW_PARTITION_DESCRIPTION);
        log::debug!("[PartitionEditor] Added partition {}", partition.id);
        self.draft.push(partition);
        &self.draft[self.draft.len() - 1]
    }

    /// Remove a partition, refusing to go below the floor
    pub fn remove(&mut self, id: &str) -> RfResult<Partition> {
        let index = self
            .draft
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RfError::UnknownPartition(id.to_string()))?;
        if !self.can_remove() {
            log::warn!(
                "[PartitionEditor] Refusing to remove '{}': {} partitions is the minimum",
                id,
                self.min_partitions
            );
            return Err(RfError::BelowMinimum {
                min: self.min_partitions,
                count: self.draft.len(),
            });
        }
        Ok(self.draft.remove(index))
    }

    /// Finish editing and hand back the new list
    pub fn commit(self) -> Vec<Partition> {
        log::info!("[PartitionEditor] Committed {} partitions", self.draft.len());
        self.draft
    }
}
