use serde_yaml::{Mapping, Value};

use super::ContainerImage;

const DEFAULT_TAG: &str = "latest";

/// Walk a document depth-first and collect every container image reference.
///
/// Two shapes are recognized on a mapping:
///
/// - Helm style: `image: { repository: nginx, tag: "1.21" }` becomes `nginx:1.21`
///   (tag defaults to `latest`).
/// - Pod spec style: `image: alpine:3.18` next to an optional `name`, which is
///   recorded as the container name.
///
/// Both checks run on every mapping before its values are visited, so a node's
/// own images come before the images found underneath it. Mapping values are
/// visited in document order. Duplicates are kept.
pub fn find_images(document: &Value) -> Vec<ContainerImage> {
    let mut images = Vec::new();
    collect(document, &mut images);
    images
}

fn collect(node: &Value, images: &mut Vec<ContainerImage>) {
    match node {
        Value::Mapping(map) => {
            if let Some(image) = helm_image(map) {
                images.push(image);
            }
            if let Some(image) = container_image(map) {
                images.push(image);
            }
            for value in map.values() {
                collect(value, images);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect(item, images);
            }
        }
        Value::Tagged(tagged) => collect(&tagged.value, images),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

/// `image: { repository: ..., tag: ... }`
fn helm_image(map: &Mapping) -> Option<ContainerImage> {
    let Some(Value::Mapping(image)) = map.get("image") else {
        return None;
    };

    let repository = non_empty_str(image.get("repository"))?;
    let tag = non_empty_str(image.get("tag")).unwrap_or(DEFAULT_TAG);

    Some(ContainerImage::new(format!("{repository}:{tag}"), ""))
}

/// `image: "repo:tag"` with an optional sibling `name`.
fn container_image(map: &Mapping) -> Option<ContainerImage> {
    let name = non_empty_str(map.get("image"))?;
    let container = map.get("name").and_then(Value::as_str).unwrap_or_default();

    Some(ContainerImage::new(name, container))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
