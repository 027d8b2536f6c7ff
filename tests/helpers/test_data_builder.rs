// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use packaging_weight_control::domain::control_record::EvidenceAttachment;
use packaging_weight_control::domain::lot::{LotConfigurationInput, MachineParameters};

// ==========================================
// LotConfigurationInput 构建器
// ==========================================
// 默认: 标称 500 g，控制限 [480, 520]

pub struct LotInputBuilder {
    input: LotConfigurationInput,
}

impl LotInputBuilder {
    pub fn new(lot: &str) -> Self {
        Self {
            input: LotConfigurationInput {
                lot: lot.to_string(),
                product: "Harina 500g".to_string(),
                nominal_weight: Some(500.0),
                lower_limit: Some(480.0),
                upper_limit: Some(520.0),
                material_lot_id: "MP-7781".to_string(),
                film_lot_id: "FL-0042".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn product(mut self, product: &str) -> Self {
        self.input.product = product.to_string();
        self
    }

    pub fn limits(mut self, lower: f64, nominal: f64, upper: f64) -> Self {
        self.input.lower_limit = Some(lower);
        self.input.nominal_weight = Some(nominal);
        self.input.upper_limit = Some(upper);
        self
    }

    pub fn without_nominal(mut self) -> Self {
        self.input.nominal_weight = None;
        self
    }

    pub fn film_lot_id(mut self, id: &str) -> Self {
        self.input.film_lot_id = id.to_string();
        self
    }

    pub fn supplier(mut self, supplier: &str) -> Self {
        self.input.supplier = Some(supplier.to_string());
        self
    }

    pub fn operators(mut self, machine: &str, sealer: &str) -> Self {
        self.input.machine_operator = Some(machine.to_string());
        self.input.sealer_operator = Some(sealer.to_string());
        self
    }

    pub fn machine(mut self, speed: i32, vertical: f64, upper: f64, lower: f64) -> Self {
        self.input.machine_parameters = MachineParameters {
            machine_speed: speed,
            vertical_seal_temp: vertical,
            horiz_seal_temp_upper: upper,
            horiz_seal_temp_lower: lower,
        };
        self
    }

    pub fn vertical_seal_failed(mut self) -> Self {
        self.input.sealing_checks.vertical_seal = false;
        self
    }

    pub fn evidence_reference(mut self, reference: &str) -> Self {
        self.input.evidence_reference = Some(reference.to_string());
        self
    }

    pub fn build(self) -> LotConfigurationInput {
        self.input
    }
}

// ==========================================
// 样本重量
// ==========================================

/// 50 个合格重量，均值 500.4（25 × 500.0 + 25 × 500.8）
pub fn approved_weights() -> Vec<f64> {
    (0..50)
        .map(|i| if i % 2 == 0 { 500.0 } else { 500.8 })
        .collect()
}

/// 49 个合格 + 第 50 个 475 g
pub fn one_underweight() -> Vec<f64> {
    let mut weights = vec![501.0; 49];
    weights.push(475.0);
    weights
}

pub fn photo(file_name: &str, size: usize) -> EvidenceAttachment {
    EvidenceAttachment {
        file_name: file_name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![0xFF; size],
    }
}
