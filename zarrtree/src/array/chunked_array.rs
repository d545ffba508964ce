//! A typed chunked array bound to a store location.

use std::{borrow::Cow, num::NonZeroUsize};

use lru::LruCache;
use parking_lot::Mutex;
use zarrtree_chunk_key_encoding::ChunkKeyEncoding;
use zarrtree_metadata::{ArrayShape, ChunkMemoryLayout, Configuration, FillValueMetadata};
use zarrtree_storage::{
    ReadableStorageTraits, ReadableWritableListableStorage, StoreKey, StorePrefix,
    WritableStorageTraits,
};

use super::{codec::Compressor, ArrayCreateError, ArrayError, Element, Endianness};

/// The parameters of a chunked array, resolved from array metadata by the hierarchy.
#[derive(Clone)]
pub struct ChunkedArrayParameters {
    /// The store holding the chunks.
    pub storage: ReadableWritableListableStorage,
    /// The prefix of the chunk keys of the array.
    pub data_prefix: StorePrefix,
    /// The array shape.
    pub shape: ArrayShape,
    /// The chunk shape.
    pub chunk_shape: ArrayShape,
    /// The byte order of encoded elements.
    pub endianness: Endianness,
    /// The order of elements within a chunk.
    pub chunk_memory_layout: ChunkMemoryLayout,
    /// The chunk key encoding.
    pub chunk_key_encoding: ChunkKeyEncoding,
    /// The compressor configuration.
    pub compressor_configuration: Configuration,
    /// The number of decoded chunks kept in memory.
    pub chunk_pool_size: usize,
    /// The fill value of unwritten elements.
    pub fill_value: FillValueMetadata,
}

#[derive(Debug)]
struct PooledChunk<T> {
    elements: Vec<T>,
    dirty: bool,
}

/// A chunked array of elements of type `T`.
///
/// Decoded chunks are held in a least recently used pool.
/// Elements written with [`set`](ChunkedArray::set) are written back to the store when their chunk is evicted,
/// on [`flush`](ChunkedArray::flush), or when the array is dropped.
pub struct ChunkedArray<T: Element> {
    storage: ReadableWritableListableStorage,
    data_prefix: StorePrefix,
    shape: ArrayShape,
    chunk_shape: ArrayShape,
    endianness: Endianness,
    chunk_memory_layout: ChunkMemoryLayout,
    chunk_key_encoding: ChunkKeyEncoding,
    compressor: Compressor,
    fill_value: T,
    chunk_num_elements: usize,
    pool: Mutex<LruCache<Vec<u64>, PooledChunk<T>>>,
}

impl<T: Element> ChunkedArray<T> {
    /// Create a chunked array with `compressor` from `parameters`.
    ///
    /// # Errors
    /// Returns [`ArrayCreateError::InvalidFillValueMetadata`] if the fill value is not representable by `T`,
    /// or another [`ArrayCreateError`] if the chunk shape does not fit the array shape or a chunk is too large to address.
    pub fn new(
        parameters: ChunkedArrayParameters,
        compressor: Compressor,
    ) -> Result<Self, ArrayCreateError> {
        if parameters.chunk_shape.len() != parameters.shape.len() {
            return Err(ArrayCreateError::InvalidChunkGridDimensionality(
                parameters.chunk_shape.len(),
                parameters.shape.len(),
            ));
        }
        if parameters.chunk_shape.contains(&0) {
            return Err(ArrayCreateError::InvalidChunkShape {
                chunk_shape: parameters.chunk_shape,
                shape: parameters.shape,
            });
        }
        let chunk_num_elements = chunk_num_elements(&parameters.chunk_shape)
            .filter(|num_elements| num_elements.checked_mul(T::DATA_TYPE.size()).is_some())
            .ok_or_else(|| ArrayCreateError::ChunkTooLarge(parameters.chunk_shape.clone()))?;
        let fill_value = T::from_fill_value(&parameters.fill_value).ok_or_else(|| {
            ArrayCreateError::InvalidFillValueMetadata {
                data_type: T::DATA_TYPE,
                fill_value_metadata: parameters.fill_value.clone(),
            }
        })?;
        let chunk_pool_size = NonZeroUsize::new(parameters.chunk_pool_size).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            storage: parameters.storage,
            data_prefix: parameters.data_prefix,
            shape: parameters.shape,
            chunk_shape: parameters.chunk_shape,
            endianness: parameters.endianness,
            chunk_memory_layout: parameters.chunk_memory_layout,
            chunk_key_encoding: parameters.chunk_key_encoding,
            compressor,
            fill_value,
            chunk_num_elements,
            pool: Mutex::new(LruCache::new(chunk_pool_size)),
        })
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunk_shape(&self) -> &[u64] {
        &self.chunk_shape
    }

    /// The number of chunks in each dimension.
    #[must_use]
    pub fn chunk_grid_shape(&self) -> ArrayShape {
        std::iter::zip(&self.shape, &self.chunk_shape)
            .map(|(&shape, &chunk_shape)| shape.div_ceil(chunk_shape))
            .collect()
    }

    /// The fill value.
    #[must_use]
    pub fn fill_value(&self) -> T {
        self.fill_value
    }

    /// The compressor.
    #[must_use]
    pub fn compressor(&self) -> &Compressor {
        &self.compressor
    }

    /// The byte order of encoded elements.
    #[must_use]
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// The order of elements within a chunk.
    #[must_use]
    pub fn chunk_memory_layout(&self) -> ChunkMemoryLayout {
        self.chunk_memory_layout
    }

    /// The capacity of the chunk pool.
    #[must_use]
    pub fn chunk_pool_size(&self) -> usize {
        self.pool.lock().cap().get()
    }

    /// The store key of the chunk at `chunk_indices`.
    #[must_use]
    pub fn chunk_key(&self, chunk_indices: &[u64]) -> StoreKey {
        self.chunk_key_encoding
            .encode(chunk_indices)
            .to_key(&self.data_prefix)
    }

    fn validate_chunk_indices(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        let chunk_grid_shape = self.chunk_grid_shape();
        if chunk_indices.len() == chunk_grid_shape.len()
            && std::iter::zip(chunk_indices, &chunk_grid_shape).all(|(index, size)| index < size)
        {
            Ok(())
        } else {
            Err(ArrayError::InvalidChunkGridIndicesError(
                chunk_indices.to_vec(),
            ))
        }
    }

    /// Split array indices into chunk indices and the linear element offset within the chunk.
    fn locate(&self, indices: &[u64]) -> Result<(Vec<u64>, usize), ArrayError> {
        if indices.len() != self.shape.len()
            || std::iter::zip(indices, &self.shape).any(|(index, size)| index >= size)
        {
            return Err(ArrayError::InvalidArrayIndices(
                indices.to_vec(),
                self.shape.clone(),
            ));
        }
        let chunk_indices = std::iter::zip(indices, &self.chunk_shape)
            .map(|(index, chunk_size)| index / chunk_size)
            .collect();
        let offset = match self.chunk_memory_layout {
            ChunkMemoryLayout::C => linear_offset(std::iter::zip(indices, &self.chunk_shape)),
            ChunkMemoryLayout::F => linear_offset(std::iter::zip(indices, &self.chunk_shape).rev()),
        };
        let offset = usize::try_from(offset).map_err(|_| {
            ArrayError::InvalidArrayIndices(indices.to_vec(), self.shape.clone())
        })?;
        Ok((chunk_indices, offset))
    }

    fn encode_chunk(&self, elements: &[T]) -> Result<Vec<u8>, ArrayError> {
        let element_size = T::DATA_TYPE.size();
        let mut bytes = vec![0u8; elements.len() * element_size];
        for (element, out) in elements.iter().zip(bytes.chunks_exact_mut(element_size)) {
            element.write_bytes(self.endianness, out);
        }
        Ok(self.compressor.encode(Cow::Owned(bytes))?.into_owned())
    }

    fn decode_chunk(&self, encoded: &[u8]) -> Result<Vec<T>, ArrayError> {
        let bytes = self.compressor.decode(Cow::Borrowed(encoded))?;
        let element_size = T::DATA_TYPE.size();
        let expected_size = self.chunk_num_elements * element_size;
        if bytes.len() != expected_size {
            return Err(ArrayError::UnexpectedChunkDecodedSize(
                bytes.len(),
                expected_size,
            ));
        }
        Ok(bytes
            .chunks_exact(element_size)
            .map(|element| T::read_bytes(element, self.endianness))
            .collect())
    }

    fn read_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<T>, ArrayError> {
        let key = self.chunk_key(chunk_indices);
        log::trace!("retrieve chunk {key}");
        match self.storage.get(&key)? {
            Some(encoded) => self.decode_chunk(&encoded),
            None => Ok(vec![self.fill_value; self.chunk_num_elements]),
        }
    }

    fn write_chunk(&self, chunk_indices: &[u64], elements: &[T]) -> Result<(), ArrayError> {
        let key = self.chunk_key(chunk_indices);
        log::trace!("store chunk {key}");
        let encoded = self.encode_chunk(elements)?;
        self.storage.set(&key, encoded.into())?;
        Ok(())
    }

    /// Run `f` on the pooled chunk at `chunk_indices`, loading it into the pool if required.
    fn with_pooled_chunk<R>(
        &self,
        chunk_indices: Vec<u64>,
        f: impl FnOnce(&mut PooledChunk<T>) -> R,
    ) -> Result<R, ArrayError> {
        let mut pool = self.pool.lock();
        if !pool.contains(&chunk_indices) && pool.len() >= pool.cap().get() {
            // the evicted chunk stays pooled until it is written
            if let Some((evicted_indices, evicted)) = pool.peek_lru() {
                if evicted.dirty {
                    self.write_chunk(evicted_indices, &evicted.elements)?;
                }
            }
            pool.pop_lru();
        }
        let elements_indices = chunk_indices.clone();
        let chunk = pool.try_get_or_insert_mut(chunk_indices, || {
            self.read_chunk(&elements_indices)
                .map(|elements| PooledChunk {
                    elements,
                    dirty: false,
                })
        })?;
        Ok(f(chunk))
    }

    /// Read the element at `indices`.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `indices` are out of bounds or the chunk cannot be read.
    pub fn get(&self, indices: &[u64]) -> Result<T, ArrayError> {
        let (chunk_indices, offset) = self.locate(indices)?;
        self.with_pooled_chunk(chunk_indices, |chunk| chunk.elements[offset])
    }

    /// Write the element at `indices`.
    ///
    /// The chunk is written to the store when it is evicted from the pool, flushed, or the array is dropped.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `indices` are out of bounds or a chunk cannot be read or written.
    pub fn set(&self, indices: &[u64], element: T) -> Result<(), ArrayError> {
        let (chunk_indices, offset) = self.locate(indices)?;
        self.with_pooled_chunk(chunk_indices, |chunk| {
            chunk.elements[offset] = element;
            chunk.dirty = true;
        })
    }

    /// Read the elements of the chunk at `chunk_indices` in chunk memory layout order.
    ///
    /// Unwritten chunks are filled with the fill value.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are out of bounds or the chunk cannot be read.
    pub fn retrieve_chunk(&self, chunk_indices: &[u64]) -> Result<Vec<T>, ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        if let Some(chunk) = self.pool.lock().peek(chunk_indices) {
            return Ok(chunk.elements.clone());
        }
        self.read_chunk(chunk_indices)
    }

    /// Write the elements of the chunk at `chunk_indices` in chunk memory layout order.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are out of bounds, the number of elements does not match the chunk shape, or the chunk cannot be written.
    pub fn store_chunk(&self, chunk_indices: &[u64], elements: &[T]) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        let expected = self.chunk_num_elements;
        if elements.len() != expected {
            return Err(ArrayError::InvalidElementCount(elements.len(), expected));
        }
        let mut pool = self.pool.lock();
        self.write_chunk(chunk_indices, elements)?;
        if let Some(chunk) = pool.peek_mut(chunk_indices) {
            chunk.elements = elements.to_vec();
            chunk.dirty = false;
        }
        Ok(())
    }

    /// Erase the chunk at `chunk_indices`. Its elements read as the fill value afterwards.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if `chunk_indices` are out of bounds or the chunk cannot be erased.
    pub fn erase_chunk(&self, chunk_indices: &[u64]) -> Result<(), ArrayError> {
        self.validate_chunk_indices(chunk_indices)?;
        let mut pool = self.pool.lock();
        pool.pop(chunk_indices);
        self.storage.erase(&self.chunk_key(chunk_indices))?;
        Ok(())
    }

    /// Write all modified pooled chunks to the store.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a chunk cannot be written.
    pub fn flush(&self) -> Result<(), ArrayError> {
        let mut pool = self.pool.lock();
        for (chunk_indices, chunk) in pool.iter_mut() {
            if chunk.dirty {
                self.write_chunk(chunk_indices, &chunk.elements)?;
                chunk.dirty = false;
            }
        }
        Ok(())
    }

    /// Returns true if the pool holds modified chunks that have not been written to the store.
    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        self.pool.lock().iter().any(|(_, chunk)| chunk.dirty)
    }
}

/// The number of elements in a chunk of `chunk_shape`, or [`None`] if it overflows [`usize`].
pub(crate) fn chunk_num_elements(chunk_shape: &[u64]) -> Option<usize> {
    chunk_shape.iter().try_fold(1usize, |num_elements, &size| {
        num_elements.checked_mul(usize::try_from(size).ok()?)
    })
}

/// The linear offset of an element within its chunk, iterating `(index, chunk size)` from the slowest varying dimension.
fn linear_offset<'a>(dimensions: impl Iterator<Item = (&'a u64, &'a u64)>) -> u64 {
    dimensions.fold(0, |offset, (index, chunk_size)| {
        offset * chunk_size + index % chunk_size
    })
}

impl<T: Element> core::fmt::Debug for ChunkedArray<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChunkedArray")
            .field("data_type", &T::DATA_TYPE)
            .field("data_prefix", &self.data_prefix)
            .field("shape", &self.shape)
            .field("chunk_shape", &self.chunk_shape)
            .field("endianness", &self.endianness)
            .field("chunk_memory_layout", &self.chunk_memory_layout)
            .field("compressor", &self.compressor.name())
            .finish_non_exhaustive()
    }
}

impl<T: Element> Drop for ChunkedArray<T> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!(
                "failed to flush chunks of array at {} on drop: {err}",
                self.data_prefix
            );
        }
    }
}
