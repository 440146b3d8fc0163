//! Static lookup tables offered to editors: suggested tags and preset
//! cover images.

use serde::{Deserialize, Serialize};

use crate::query::Selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverCategory {
    Business,
    Strategy,
    Analysis,
    Decision,
    Creative,
    Innovation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetCover {
    pub id: &'static str,
    pub url: &'static str,
    pub label: &'static str,
    pub category: CoverCategory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CoverQuery {
    pub category: Selector<CoverCategory>,
}

pub const SUGGESTED_TAGS: [&str; 10] = [
    "战略", "分析", "思维", "创新", "管理", "决策", "效率", "逻辑", "沟通", "规划",
];

const fn cover(
    id: &'static str,
    photo: &'static str,
    label: &'static str,
    category: CoverCategory,
) -> PresetCover {
    PresetCover {
        id,
        url: photo,
        label,
        category,
    }
}

pub const PRESET_COVERS: [PresetCover; 16] = {
    use CoverCategory::*;
    [
        cover("1", "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=800&h=400&fit=crop", "商业会议", Business),
        cover("2", "https://images.unsplash.com/photo-1552664730-d307ca884978?w=800&h=400&fit=crop", "团队协作", Business),
        cover("3", "https://images.unsplash.com/photo-1531403009284-440f080d1e12?w=800&h=400&fit=crop", "战略规划", Strategy),
        cover("4", "https://images.unsplash.com/photo-1542744173-8e7e53415bb0?w=800&h=400&fit=crop", "商务演示", Business),
        cover("5", "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&h=400&fit=crop", "数据分析", Analysis),
        cover("6", "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=800&h=400&fit=crop", "图表可视化", Analysis),
        cover("7", "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800&h=400&fit=crop", "决策分析", Decision),
        cover("8", "https://images.unsplash.com/photo-1504868584819-f8e8b4b6d7e3?w=800&h=400&fit=crop", "数据仪表盘", Analysis),
        cover("9", "https://images.unsplash.com/photo-1507925921958-8a62f3d1a50d?w=800&h=400&fit=crop", "创意笔记", Creative),
        cover("10", "https://images.unsplash.com/photo-1512758017271-d7b84c2113f1?w=800&h=400&fit=crop", "灵感创意", Creative),
        cover("11", "https://images.unsplash.com/photo-1517245386807-bb43f82c33c4?w=800&h=400&fit=crop", "头脑风暴", Innovation),
        cover("12", "https://images.unsplash.com/photo-1556761175-5973dc0f32e7?w=800&h=400&fit=crop", "创新团队", Innovation),
        cover("13", "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=800&h=400&fit=crop", "专注思考", Decision),
        cover("14", "https://images.unsplash.com/photo-1517842645767-c639042777db?w=800&h=400&fit=crop", "深度阅读", Strategy),
        cover("15", "https://images.unsplash.com/photo-1434030216411-0b793f4b4173?w=800&h=400&fit=crop", "学习成长", Strategy),
        cover("16", "https://images.unsplash.com/photo-1484480974693-6ca0a78fb36b?w=800&h=400&fit=crop", "目标规划", Strategy),
    ]
};

/// Preset covers in table order, optionally narrowed to one category.
pub fn covers(query: &CoverQuery) -> Vec<PresetCover> {
    PRESET_COVERS
        .iter()
        .filter(|c| query.category.matches(&c.category))
        .cloned()
        .collect()
}
