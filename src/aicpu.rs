//! Operator registrations for the AICPU hardware backend.
//!
//! Each registration is a static descriptor naming an operator's inputs,
//! outputs, required attributes and supported dtype combinations. The table
//! is built once at first use and is read-only thereafter; the backend
//! runtime consumes it when selecting kernels.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::value::DataType;

/// Primitive type of a registered attribute.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AttrType {
    Int,
    Float,
    Bool,
}

/// How the backend treats a fused subgraph containing this operator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FusionType {
    /// The operator cannot participate in fusion.
    Opaque,
}

/// One input or output slot of a registered operator.
#[derive(Clone, Debug)]
pub struct IoDef {
    pub index: usize,
    pub name: &'static str,
    pub required: bool,
}

/// A required attribute of a registered operator.
#[derive(Clone, Debug)]
pub struct AttrDef {
    pub name: &'static str,
    pub attr_type: AttrType,
}

/// Registration descriptor for one operator on the AICPU backend.
///
/// Built with [`AicpuOpInfo::build`]; immutable afterwards.
#[derive(Clone, Debug)]
pub struct AicpuOpInfo {
    name: &'static str,
    fusion_type: FusionType,
    inputs: Vec<IoDef>,
    outputs: Vec<IoDef>,
    attrs: Vec<AttrDef>,
    /// Supported dtype assignments, one entry per combination. Each entry
    /// lists a dtype per input followed by a dtype per output, in slot
    /// order.
    dtype_formats: Vec<Vec<DataType>>,
}

impl AicpuOpInfo {
    pub fn build(name: &'static str) -> AicpuOpInfoBuilder {
        AicpuOpInfoBuilder {
            info: AicpuOpInfo {
                name,
                fusion_type: FusionType::Opaque,
                inputs: Vec::new(),
                outputs: Vec::new(),
                attrs: Vec::new(),
                dtype_formats: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fusion_type(&self) -> FusionType {
        self.fusion_type
    }

    pub fn inputs(&self) -> &[IoDef] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[IoDef] {
        &self.outputs
    }

    pub fn attrs(&self) -> &[AttrDef] {
        &self.attrs
    }

    pub fn dtype_formats(&self) -> &[Vec<DataType>] {
        &self.dtype_formats
    }

    /// Return true if the backend supports the given input/output dtype
    /// assignment, listed in slot order.
    pub fn supports_dtypes(&self, dtypes: &[DataType]) -> bool {
        self.dtype_formats.iter().any(|combo| combo == dtypes)
    }
}

/// Chained builder for [`AicpuOpInfo`].
pub struct AicpuOpInfoBuilder {
    info: AicpuOpInfo,
}

impl AicpuOpInfoBuilder {
    pub fn fusion_type(mut self, fusion_type: FusionType) -> Self {
        self.info.fusion_type = fusion_type;
        self
    }

    pub fn input(mut self, index: usize, name: &'static str) -> Self {
        self.info.inputs.push(IoDef {
            index,
            name,
            required: true,
        });
        self
    }

    pub fn output(mut self, index: usize, name: &'static str) -> Self {
        self.info.outputs.push(IoDef {
            index,
            name,
            required: true,
        });
        self
    }

    pub fn attr(mut self, name: &'static str, attr_type: AttrType) -> Self {
        self.info.attrs.push(AttrDef { name, attr_type });
        self
    }

    /// Declare a supported dtype combination, one dtype per input then one
    /// per output.
    pub fn dtype_format(mut self, dtypes: &[DataType]) -> Self {
        self.info.dtype_formats.push(dtypes.to_vec());
        self
    }

    pub fn finish(self) -> AicpuOpInfo {
        self.info
    }
}

static AICPU_OPS: LazyLock<FxHashMap<&'static str, AicpuOpInfo>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();

    let info = AicpuOpInfo::build("RandomChoiceWithMask")
        .fusion_type(FusionType::Opaque)
        .input(0, "input_x")
        .output(0, "index")
        .output(1, "mask")
        .attr("count", AttrType::Int)
        .attr("seed", AttrType::Int)
        .attr("seed2", AttrType::Int)
        .dtype_format(&[DataType::Bool, DataType::Int32, DataType::Bool])
        .finish();
    table.insert(info.name(), info);

    table
});

/// Look up the AICPU registration for an operator, if it has one.
pub fn aicpu_op_info(name: &str) -> Option<&'static AicpuOpInfo> {
    AICPU_OPS.get(name)
}
