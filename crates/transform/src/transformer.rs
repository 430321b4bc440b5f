//! The transformer port and the shared extraction pipeline.
//!
//! A [`Transformer`] only knows how to decode its format into a [`Document`].
//! Everything after that (root resolution, field binding, the empty-result
//! rule) is format-independent and lives in [`TransformExt`], which every
//! transformer gets for free.

use exchange::ResponseEnvelope;
use tracing::warn;

use crate::{AliasMap, BindingTable, DecodeError, Document, Entity, Format, Node, TransformError};

/// Decodes one document format.
pub trait Transformer: Send + Sync {
    /// The format this transformer decodes.
    fn format(&self) -> Format;

    /// Parses `text` into a format-neutral document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when `text` is not well-formed in this format.
    fn decode(&self, text: &str) -> Result<Document, DecodeError>;

    /// Alias declarations implied by the format itself.
    ///
    /// Merged underneath the caller's alias on every call; the caller's
    /// declarations win.
    fn conventions(&self) -> Option<AliasMap> {
        None
    }
}

/// Entity extraction, available on every [`Transformer`].
pub trait TransformExt: Transformer {
    /// Decodes `text` and binds every node under the alias root as a `T`.
    ///
    /// A root that matches nothing yields an empty vector, never an error.
    ///
    /// # Errors
    ///
    /// - [`TransformError::Binding`] if `T`'s binding table conflicts with the
    ///   alias. Checked before `text` is parsed.
    /// - [`TransformError::Decode`] if `text` is malformed.
    fn transform<T: Entity>(&self, text: &str, alias: &AliasMap) -> Result<Vec<T>, TransformError> {
        let alias = self.effective_alias(alias);
        let table = BindingTable::<T>::new(&alias)?;
        let document = self.decode(text)?;

        let roots = alias.resolve_root(&document);
        if roots.is_empty() {
            warn!(
                format = %self.format(),
                root_key = alias.root_key().unwrap_or("<document>"),
                type_name = T::TYPE_NAME,
                "Alias root matched nothing"
            );
        }
        Ok(roots.into_iter().map(|node| table.bind(node, &alias)).collect())
    }

    /// Runs [`TransformExt::transform`] over a response body.
    ///
    /// The status code is not inspected; an error page is transformed like
    /// any other body.
    ///
    /// # Errors
    ///
    /// As for [`TransformExt::transform`].
    fn transform_envelope<T: Entity>(
        &self,
        envelope: &ResponseEnvelope,
        alias: &AliasMap,
    ) -> Result<Vec<T>, TransformError> {
        self.transform(envelope.body_as_text(), alias)
    }

    /// Decodes `text` and returns the untyped nodes under the alias root.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Decode`] if `text` is malformed.
    fn extract_nodes(&self, text: &str, alias: &AliasMap) -> Result<Vec<Node>, TransformError> {
        let alias = self.effective_alias(alias);
        let document = self.decode(text)?;
        Ok(alias.resolve_root(&document).into_iter().cloned().collect())
    }

    /// The caller's alias with this format's conventions filled in.
    fn effective_alias(&self, alias: &AliasMap) -> AliasMap {
        match self.conventions() {
            Some(defaults) => alias.merged_with(&defaults),
            None => alias.clone(),
        }
    }
}

impl<X: Transformer + ?Sized> TransformExt for X {}
