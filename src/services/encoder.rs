use crate::models::{Column, FeatureSchema, FeatureVector, Field, QuestionnaireAnswer, WeatherCategory};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("questionnaire field '{0}' is empty")]
    EmptyField(Field),
}

/// Encodes one questionnaire answer plus weather against the trained schema
///
/// The live record contributes exactly one indicator per field. Each schema
/// column is set when its `(field, value)` pair is among them; indicators the
/// schema does not know about are dropped, so an unseen value leaves its
/// field's block all zeros.
pub fn encode(
    answer: &QuestionnaireAnswer,
    weather: WeatherCategory,
    schema: &FeatureSchema,
) -> Result<FeatureVector, EncodingError> {
    let live = live_indicators(answer, weather)?;

    let values = schema
        .columns()
        .iter()
        .map(|column| u8::from(live.contains(column)))
        .collect();

    Ok(FeatureVector::new(values, schema.fingerprint()))
}

/// The sparse one-hot view of a single record, before alignment
fn live_indicators(
    answer: &QuestionnaireAnswer,
    weather: WeatherCategory,
) -> Result<Vec<Column>, EncodingError> {
    Field::ALL
        .iter()
        .map(|field| {
            let value = answer.value(*field).unwrap_or(weather.as_str());
            if value.is_empty() {
                return Err(EncodingError::EmptyField(*field));
            }
            Ok(Column::new(*field, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::from_observations([
            (Field::GeneralProductType, "Agua"),
            (Field::GeneralProductType, "Helado"),
            (Field::CravingType, "dulce"),
            (Field::CravingType, "salado"),
            (Field::Base, "agua"),
            (Field::Base, "leche"),
            (Field::FlavorType, "fruta"),
            (Field::Weather, "sunny"),
            (Field::Weather, "rainy"),
        ])
    }

    #[test]
    fn test_encode_sets_matching_columns_in_schema_order() {
        let schema = schema();
        let answer = QuestionnaireAnswer::new("Agua", "dulce", "agua", "fruta");

        let vector = encode(&answer, WeatherCategory::Sunny, &schema).unwrap();

        // Agua, Helado, dulce, salado, agua, leche, fruta, rainy, sunny
        assert_eq!(vector.values(), &[1, 0, 1, 0, 1, 0, 1, 0, 1]);
        assert_eq!(vector.schema_fingerprint(), schema.fingerprint());
    }

    #[test]
    fn test_unknown_values_leave_field_block_empty() {
        let schema = schema();
        let answer = QuestionnaireAnswer::new("Especialidad", "picante", "leche", "chile");

        let vector = encode(&answer, WeatherCategory::Cloudy, &schema).unwrap();

        assert_eq!(vector.values(), &[0, 0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_values_match_exactly() {
        let schema = schema();
        // Case differs from the trained value "Agua"
        let answer = QuestionnaireAnswer::new("agua", "dulce", "agua", "fruta");

        let vector = encode(&answer, WeatherCategory::Rainy, &schema).unwrap();

        assert_eq!(vector.values()[0], 0);
        assert_eq!(vector.values()[7], 1);
    }

    #[test]
    fn test_encode_is_idempotent() {
        let schema = schema();
        let answer = QuestionnaireAnswer::new("Helado", "salado", "leche", "fruta");

        let first = encode(&answer, WeatherCategory::Rainy, &schema).unwrap();
        let second = encode(&answer, WeatherCategory::Rainy, &schema).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let schema = schema();
        let answer = QuestionnaireAnswer::new("Agua", "", "agua", "fruta");

        assert_eq!(
            encode(&answer, WeatherCategory::Sunny, &schema),
            Err(EncodingError::EmptyField(Field::CravingType))
        );
    }

    #[test]
    fn test_empty_schema_gives_empty_vector() {
        let schema = FeatureSchema::new(Vec::new());
        let answer = QuestionnaireAnswer::new("Agua", "dulce", "agua", "fruta");

        let vector = encode(&answer, WeatherCategory::Sunny, &schema).unwrap();
        assert!(vector.is_empty());
    }
}
