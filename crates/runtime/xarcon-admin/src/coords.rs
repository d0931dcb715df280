//! Coordinate editor

use xarcon_core::Property;

use crate::{AdminPanel, Result, SubmitMode, ValidationError};

/// Six decimals, about a tenth of a metre
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

impl AdminPanel {
    /// Pin a listing on the map, or clear its pin with `None`
    pub async fn set_coordinates(&mut self, id: &str, position: Option<(f64, f64)>) -> Result<Property> {
        if let Some((lat, lng)) = position {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(ValidationError::CoordinatesOutOfRange.into());
            }
        }

        let mut property = self.find(id).await?;
        property.latitude = position.map(|(lat, _)| round_coordinate(lat));
        property.longitude = position.map(|(_, lng)| round_coordinate(lng));
        tracing::info!("Setting coordinates of {} to {:?}", id, property.coordinates());

        self.save(property, SubmitMode::Edit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_coordinate() {
        assert_eq!(round_coordinate(12.11499264), 12.114993);
        assert_eq!(round_coordinate(-86.2361744), -86.236174);
        assert_eq!(round_coordinate(0.0), 0.0);
    }
}
