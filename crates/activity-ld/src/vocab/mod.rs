//! Built-in ActivityStreams 2.0 core catalogue.
//!
//! Types are declared as data with [`TypeSchema::builder`]; subtypes inherit
//! their parent's properties and capabilities through `extends`.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::codec::Codec;
use crate::error::RegistryError;
use crate::model::{Kind, PropertySpec, TypeSchema};
use crate::registry::{RegistryBuilder, TypeRegistry};

/// An object, a link, or an IRI naming either.
pub const REFERENCE: &[Kind] = &[Kind::Object, Kind::Link, Kind::Iri];
/// Plain or language-tagged text.
pub const TEXT: &[Kind] = &[Kind::String, Kind::LangString];
pub const IRI: &[Kind] = &[Kind::Iri];
pub const DATE_TIME: &[Kind] = &[Kind::DateTime];
pub const IMAGE_REFERENCE: &[Kind] = &[Kind::Image, Kind::Link, Kind::Iri];
pub const LINK_REFERENCE: &[Kind] = &[Kind::Link, Kind::Iri];
pub const COLLECTION_REFERENCE: &[Kind] = &[Kind::Collection, Kind::Link, Kind::Iri];
pub const ORDERED_COLLECTION_REFERENCE: &[Kind] = &[Kind::OrderedCollection, Kind::Link, Kind::Iri];
pub const DURATION: &[Kind] = &[Kind::Duration];
pub const MIME_TYPE: &[Kind] = &[Kind::MimeType];
pub const STRING: &[Kind] = &[Kind::String];
pub const LANGUAGE_TAG: &[Kind] = &[Kind::Bcp47];
pub const COUNT: &[Kind] = &[Kind::NonNegativeInteger];
pub const OBJECT_OR_LINK: &[Kind] = &[Kind::Object, Kind::Link];
pub const OBJECT_OR_IRI: &[Kind] = &[Kind::Object, Kind::Iri];
/// `Question.closed`: when, whether, or by what a question was closed.
pub const CLOSED: &[Kind] = &[
    Kind::DateTime,
    Kind::Boolean,
    Kind::Object,
    Kind::Link,
    Kind::Iri,
];

fn object() -> Result<TypeSchema, RegistryError> {
    TypeSchema::builder("Object")
        .capability(Kind::Object)
        .functional("id", IRI)
        .non_functional("attachment", REFERENCE)
        .non_functional("attributedTo", REFERENCE)
        .non_functional("audience", REFERENCE)
        .non_functional("bcc", REFERENCE)
        .non_functional("bto", REFERENCE)
        .non_functional("cc", REFERENCE)
        .language_mapped("content", TEXT)
        .non_functional("context", REFERENCE)
        .functional("duration", DURATION)
        .functional("endTime", DATE_TIME)
        .non_functional("generator", REFERENCE)
        .non_functional("icon", IMAGE_REFERENCE)
        .non_functional("image", IMAGE_REFERENCE)
        .non_functional("inReplyTo", REFERENCE)
        .non_functional("location", REFERENCE)
        .functional("mediaType", MIME_TYPE)
        .language_mapped("name", TEXT)
        .non_functional("preview", REFERENCE)
        .functional("published", DATE_TIME)
        .functional("replies", COLLECTION_REFERENCE)
        .functional("startTime", DATE_TIME)
        .language_mapped("summary", TEXT)
        .non_functional("tag", REFERENCE)
        .non_functional("to", REFERENCE)
        .functional("updated", DATE_TIME)
        .non_functional("url", LINK_REFERENCE)
        .build()
}

fn link() -> Result<TypeSchema, RegistryError> {
    TypeSchema::builder("Link")
        .capability(Kind::Link)
        .functional("id", IRI)
        .functional("href", IRI)
        .non_functional("rel", STRING)
        .functional("mediaType", MIME_TYPE)
        .language_mapped("name", TEXT)
        .functional("hreflang", LANGUAGE_TAG)
        .functional("height", COUNT)
        .functional("width", COUNT)
        .non_functional("preview", OBJECT_OR_LINK)
        .build()
}

fn intransitive_activity(object: &TypeSchema) -> Result<TypeSchema, RegistryError> {
    TypeSchema::builder("IntransitiveActivity")
        .extends(object)
        .non_functional("actor", REFERENCE)
        .non_functional("target", REFERENCE)
        .non_functional("result", REFERENCE)
        .non_functional("origin", REFERENCE)
        .non_functional("instrument", REFERENCE)
        .build()
}

fn collection(object: &TypeSchema) -> Result<TypeSchema, RegistryError> {
    TypeSchema::builder("Collection")
        .extends(object)
        .capability(Kind::Collection)
        .functional("totalItems", COUNT)
        .functional("current", COLLECTION_REFERENCE)
        .functional("first", COLLECTION_REFERENCE)
        .functional("last", COLLECTION_REFERENCE)
        .non_functional("items", REFERENCE)
        .build()
}

/// Registers every catalogue type into `builder`.
///
/// Use this to extend the built-in vocabulary with additional types before
/// freezing the registry.
pub fn register_catalogue(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let object = object()?;
    let intransitive = intransitive_activity(&object)?;
    let collection = collection(&object)?;

    let activity = TypeSchema::builder("Activity")
        .extends(&intransitive)
        .non_functional("object", REFERENCE)
        .build()?;

    let document = TypeSchema::builder("Document").extends(&object).build()?;

    let ordered_collection = TypeSchema::builder("OrderedCollection")
        .extends(&collection)
        .capability(Kind::OrderedCollection)
        .non_functional("orderedItems", REFERENCE)
        .build()?;

    let collection_page = TypeSchema::builder("CollectionPage")
        .extends(&collection)
        .functional("partOf", COLLECTION_REFERENCE)
        .functional("next", COLLECTION_REFERENCE)
        .functional("prev", COLLECTION_REFERENCE)
        .build()?;

    let link = link()?;

    builder
        .register(TypeSchema::builder("Mention").extends(&link).build()?)?
        .register(TypeSchema::builder("Image").extends(&document).capability(Kind::Image).build()?)?
        .register(TypeSchema::builder("Note").extends(&object).build()?)?
        .register(TypeSchema::builder("Article").extends(&object).build()?)?
        .register(
            TypeSchema::builder("Question")
                .extends(&intransitive)
                .non_functional("oneOf", REFERENCE)
                .non_functional("anyOf", REFERENCE)
                .property(PropertySpec::functional("closed", CLOSED))
                .build()?,
        )?
        .register(
            TypeSchema::builder("Person")
                .extends(&object)
                .functional("inbox", ORDERED_COLLECTION_REFERENCE)
                .functional("outbox", ORDERED_COLLECTION_REFERENCE)
                .functional("following", COLLECTION_REFERENCE)
                .functional("followers", COLLECTION_REFERENCE)
                .functional("liked", COLLECTION_REFERENCE)
                .property(PropertySpec::functional("preferredUsername", TEXT).with_language_map())
                .build()?,
        )?
        .register(TypeSchema::builder("Create").extends(&activity).build()?)?
        .register(
            TypeSchema::builder("OrderedCollectionPage")
                .extends(&ordered_collection)
                .extends(&collection_page)
                .functional("startIndex", COUNT)
                .build()?,
        )?
        .register(
            TypeSchema::builder("Tombstone")
                .extends(&object)
                .non_functional("formerType", OBJECT_OR_IRI)
                .functional("deleted", DATE_TIME)
                .build()?,
        )?
        .register(object)?
        .register(link)?
        .register(intransitive)?
        .register(activity)?
        .register(document)?
        .register(collection)?
        .register(ordered_collection)?
        .register(collection_page)?;
    Ok(())
}

/// Builds a registry holding exactly the catalogue types.
pub fn build_catalogue() -> Result<TypeRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    register_catalogue(&mut builder)?;
    Ok(builder.build())
}

lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<TypeRegistry> =
        Arc::new(build_catalogue().expect("built-in catalogue declarations are consistent"));
}

/// The process-wide catalogue registry, built on first access.
pub fn default_registry() -> &'static Arc<TypeRegistry> {
    &DEFAULT_REGISTRY
}

/// A codec over the catalogue registry with default options.
pub fn default_codec() -> Codec {
    Codec::new(Arc::clone(default_registry()))
}
