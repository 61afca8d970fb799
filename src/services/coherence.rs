use rand::{seq::IndexedRandom, Rng};

use crate::{models::ProductId, services::catalog::ProductCatalog};

/// Lowercases, trims and drops one trailing `s` ("Paletas" -> "paleta")
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    match lowered.strip_suffix('s') {
        Some(singular) => singular.to_string(),
        None => lowered,
    }
}

/// Loose containment test between a declared product type and a category tag
///
/// Either normalized string containing the other counts as a match. An empty
/// normalized side never matches.
pub fn is_coherent(declared_type: &str, category: &str) -> bool {
    let declared = normalize(declared_type);
    let category = normalize(category);

    if declared.is_empty() || category.is_empty() {
        return false;
    }

    category.contains(&declared) || declared.contains(&category)
}

/// Keeps the predicted product when its category fits the declared type,
/// otherwise picks a random product that does
///
/// When no catalog product fits, the prediction is returned unchanged.
pub fn correct<R: Rng + ?Sized>(
    declared_type: &str,
    predicted: ProductId,
    catalog: &ProductCatalog,
    rng: &mut R,
) -> ProductId {
    let coherent = catalog
        .get(&predicted)
        .is_some_and(|product| is_coherent(declared_type, &product.category));

    if coherent {
        return predicted;
    }

    let candidates: Vec<&ProductId> = catalog
        .iter()
        .filter(|(_, product)| is_coherent(declared_type, &product.category))
        .map(|(id, _)| id)
        .collect();

    match candidates.choose(rng) {
        Some(substitute) => {
            tracing::debug!(
                declared_type = %declared_type,
                predicted = %predicted,
                substitute = %substitute,
                candidates = candidates.len(),
                "Replaced incoherent prediction"
            );
            (*substitute).clone()
        }
        None => {
            tracing::debug!(
                declared_type = %declared_type,
                predicted = %predicted,
                "No coherent alternative, keeping prediction"
            );
            predicted
        }
    }
}
