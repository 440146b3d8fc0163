//! Demo records for a fresh in-memory deployment.
//!
//! Community content (discussions, comments, meetups, consultations) keeps
//! the ids front-end mocks were written against. Market, topic and action
//! rows are a small hand-written set that references the same model ids.

use chrono::{DateTime, Duration, TimeZone, Utc};
use domains::models::*;

/// Owner of the seeded topics and actions; the bootstrap admin takes this id.
pub const DEMO_OWNER_ID: &str = "1";

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_default()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| (*t).to_owned()).collect()
}

fn avatar(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

pub fn users() -> Vec<UserInfo> {
    [
        ("1", "思维探索者", "explorer"),
        ("2", "创新先锋", "pioneer"),
        ("3", "逻辑大师", "logic"),
        ("4", "灵感捕手", "catch"),
        ("5", "问题终结者", "solver"),
    ]
    .into_iter()
    .map(|(id, name, seed)| UserInfo::new(id, name, avatar(seed)))
    .collect()
}

fn user(index: usize) -> UserInfo {
    users()
        .get(index)
        .cloned()
        .unwrap_or_else(|| UserInfo::new("0", "匿名", avatar("anon")))
}

fn profile(index: usize, bio: &str, interests: &[&str]) -> UserInfo {
    UserInfo {
        bio: Some(bio.to_owned()),
        interests: Some(tags(interests)),
        ..user(index)
    }
}

struct DiscussionSeed {
    id: &'static str,
    title: &'static str,
    content: &'static str,
    summary: &'static str,
    cover: Option<&'static str>,
    author: usize,
    model: Option<(&'static str, &'static str)>,
    category: DiscussionCategory,
    tags: &'static [&'static str],
    /// views, likes, comments, favorites
    counts: [u64; 4],
    is_top: bool,
    is_featured: bool,
    published: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl DiscussionSeed {
    fn build(self) -> Discussion {
        let [view_count, like_count, comment_count, favorite_count] = self.counts;
        Discussion {
            id: self.id.into(),
            title: self.title.into(),
            content: self.content.into(),
            summary: self.summary.into(),
            cover: self.cover.map(str::to_owned),
            user: user(self.author),
            model_id: self.model.map(|(id, _)| id.to_owned()),
            model_name: self.model.map(|(_, name)| name.to_owned()),
            category: self.category,
            tags: tags(self.tags),
            view_count,
            like_count,
            comment_count,
            favorite_count,
            is_top: self.is_top,
            is_featured: self.is_featured,
            is_liked: None,
            is_favorited: None,
            status: DiscussionStatus::Published,
            publish_time: self.published,
            created_at: self.published,
            updated_at: self.updated,
            likes: Reactions::default(),
            favorites: Reactions::default(),
        }
    }
}

pub fn discussions() -> Vec<Discussion> {
    use DiscussionCategory::*;
    [
        DiscussionSeed {
            id: "1",
            title: "如何用第一性原理思考职业发展？",
            content: "最近在思考职业发展的问题，尝试用第一性原理来分析。\n\n传统观念告诉我们要按部就班：读书 → 找工作 → 升职加薪。但如果回归本质，职业发展的目的是什么？\n\n我的思考是：经济独立、价值实现、持续成长。从这三个基本原则出发，传统的职业路径并不是唯一选择。",
            summary: "尝试用第一性原理分析职业发展，探讨传统职业路径之外的可能性",
            cover: Some("https://images.unsplash.com/photo-1507679799987-c73779587ccf?w=800"),
            author: 0,
            model: Some(("3", "第一性原理思维")),
            category: Methodology,
            tags: &["职业发展", "第一性原理", "人生规划"],
            counts: [1234, 89, 23, 45],
            is_top: true,
            is_featured: true,
            published: at(2024, 2, 10, 10, 30),
            updated: at(2024, 2, 12, 15, 20),
        },
        DiscussionSeed {
            id: "2",
            title: "💡 灵感分享：用 SWOT 分析法评估创业想法",
            content: "最近有个创业想法，用 SWOT 分析了一下，分享给大家。\n\n项目：社区团购小程序。优势是技术团队经验丰富，劣势是没有供应链经验，机会是社区经济崛起，威胁是巨头已经入场。\n\n分析完感觉挑战不小，但也看到了一些差异化机会。大家觉得这个方向可行吗？",
            summary: "用 SWOT 分析社区团购创业项目的可行性",
            cover: None,
            author: 1,
            model: Some(("1", "SWOT 分析模型")),
            category: Case,
            tags: &["创业", "SWOT", "社区团购", "案例分析"],
            counts: [856, 56, 34, 28],
            is_top: false,
            is_featured: true,
            published: at(2024, 2, 9, 14, 20),
            updated: at(2024, 2, 11, 9, 15),
        },
        DiscussionSeed {
            id: "3",
            title: "为什么我们总是无法做出满意的决策？",
            content: "发现一个有趣的现象：即使有了决策矩阵这样的工具，很多人还是经常后悔自己的选择。\n\n信息过载、完美主义、损失厌恶、后见之明，有没有什么方法可以帮助我们更平和地接受自己的决策？",
            summary: "探讨为什么有了决策工具还是难以做出满意决策",
            cover: Some("https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800"),
            author: 2,
            model: None,
            category: Question,
            tags: &["决策", "心理学", "选择困难"],
            counts: [2341, 167, 89, 112],
            is_top: false,
            is_featured: false,
            published: at(2024, 2, 8, 18, 45),
            updated: at(2024, 2, 10, 20, 30),
        },
        DiscussionSeed {
            id: "4",
            title: "六顶思考帽在团队会议中的实践心得",
            content: "在团队中实践六顶思考帽一个月了，分享一些心得。\n\n效果明显的场景：头脑风暴会议、项目复盘、棘手问题讨论。\n\n意外收获：团队氛围变好了！每个人都有机会表达不同角度的想法。",
            summary: "六顶思考帽在团队会议中的一个月实践心得",
            cover: None,
            author: 3,
            model: Some(("6", "六顶思考帽")),
            category: Share,
            tags: &["六顶思考帽", "团队管理", "会议技巧", "经验分享"],
            counts: [678, 45, 12, 34],
            is_top: false,
            is_featured: false,
            published: at(2024, 2, 7, 11, 0),
            updated: at(2024, 2, 9, 14, 45),
        },
        DiscussionSeed {
            id: "5",
            title: "突然想到：AI 时代，什么样的思维能力最重要？",
            content: "刚才在用 AI 写代码，突然想到一个问题：AI 能做越来越多的事情，那人类还需要学习什么思维技能？\n\n我的猜想：提问能力、系统思维、批判性思维、创造性思维。你们觉得呢？欢迎碰撞！💭",
            summary: "AI 时代人类最需要什么样的思维能力？",
            cover: Some("https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800"),
            author: 4,
            model: None,
            category: Inspiration,
            tags: &["AI", "思维能力", "未来趋势", "灵感"],
            counts: [3456, 234, 156, 189],
            is_top: true,
            is_featured: true,
            published: at(2024, 2, 6, 20, 15),
            updated: at(2024, 2, 12, 8, 0),
        },
        DiscussionSeed {
            id: "6",
            title: "读书笔记：《思考，快与慢》中的认知偏差",
            content: "最近重读了卡尼曼的《思考，快与慢》，整理了一些常见的认知偏差。\n\n锚定效应、可得性偏差、代表性偏差、损失厌恶。\n\n如何应对？放慢决策速度，主动寻找反例，用数据代替直觉，建立检查清单。",
            summary: "《思考，快与慢》读书笔记：常见认知偏差及应对方法",
            cover: None,
            author: 0,
            model: None,
            category: Share,
            tags: &["读书笔记", "认知偏差", "思考快与慢", "心理学"],
            counts: [1567, 123, 45, 178],
            is_top: false,
            is_featured: true,
            published: at(2024, 2, 5, 16, 30),
            updated: at(2024, 2, 8, 12, 0),
        },
    ]
    .into_iter()
    .map(DiscussionSeed::build)
    .collect()
}

fn comment(
    id: &str,
    parent_id: Option<&str>,
    author: usize,
    content: &str,
    like_count: u64,
    created_at: DateTime<Utc>,
    replies: Vec<Comment>,
) -> Comment {
    Comment {
        id: id.into(),
        discussion_id: "1".into(),
        parent_id: parent_id.map(str::to_owned),
        reply_to_id: None,
        reply_to_name: None,
        content: content.into(),
        user: user(author),
        like_count,
        reply_count: replies.len() as u64,
        is_liked: None,
        created_at,
        replies,
        likes: Reactions::default(),
    }
}

/// Top-level comments on discussion "1", replies nested.
pub fn comments() -> Vec<Comment> {
    let mut answer = comment(
        "1-2",
        Some("1"),
        1,
        "@逻辑大师 主要是旅行和学习新技能，最大的收获是明确了自己真正的兴趣方向",
        5,
        at(2024, 2, 10, 15, 0),
        vec![],
    );
    answer.reply_to_id = Some("3".into());
    answer.reply_to_name = Some("逻辑大师".into());

    vec![
        comment(
            "1",
            None,
            1,
            "非常认同！我也经历过类似的思考过程。后来选择了 gap year，虽然当时家人不理解，但确实让我更清楚自己想要什么。",
            12,
            at(2024, 2, 10, 12, 0),
            vec![
                comment(
                    "1-1",
                    Some("1"),
                    2,
                    "Gap year 那段时间都在做什么？有什么收获吗？",
                    3,
                    at(2024, 2, 10, 14, 30),
                    vec![],
                ),
                answer,
            ],
        ),
        comment(
            "2",
            None,
            3,
            "第一性原理确实是个好框架，但我觉得也不能完全忽视经验和传统路径的价值。毕竟有些坑前人已经帮我们踩过了。",
            8,
            at(2024, 2, 10, 16, 0),
            vec![comment(
                "2-1",
                Some("2"),
                0,
                "说得对，关键是要在创新和借鉴之间找到平衡",
                6,
                at(2024, 2, 10, 17, 0),
                vec![],
            )],
        ),
        comment(
            "3",
            None,
            4,
            "我觉得职业成功的定义因人而异。有人追求财务自由，有人追求社会影响力，有人追求工作生活平衡。没有标准答案。",
            15,
            at(2024, 2, 11, 9, 0),
            vec![],
        ),
    ]
}

struct MeetupSeed {
    id: &'static str,
    title: &'static str,
    topic: MeetupTopic,
    description: &'static str,
    thoughts: &'static str,
    host: UserInfo,
    model: Option<(&'static str, &'static str)>,
    tags: &'static [&'static str],
    city: &'static str,
    preferred_time: &'static str,
    cost_split: CostSplit,
    /// max, current
    guests: (u32, u32),
    status: MeetupStatus,
    view_count: u64,
    interested_count: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl MeetupSeed {
    fn build(self, applications: &[MeetupApplication]) -> Meetup {
        let mut applicants = Reactions::default();
        let mut application_count = 0;
        for a in applications.iter().filter(|a| a.meetup_id == self.id) {
            applicants.add(&a.applicant.id);
            application_count += 1;
        }
        Meetup {
            id: self.id.into(),
            title: self.title.into(),
            topic: self.topic,
            description: self.description.into(),
            thoughts: self.thoughts.into(),
            host: self.host,
            model_id: self.model.map(|(id, _)| id.to_owned()),
            model_name: self.model.map(|(_, name)| name.to_owned()),
            tags: tags(self.tags),
            city: self.city.into(),
            location: None,
            preferred_time: self.preferred_time.into(),
            scheduled_time: None,
            cost_split: self.cost_split,
            max_guests: self.guests.0,
            current_guests: self.guests.1,
            status: self.status,
            view_count: self.view_count,
            interested_count: self.interested_count,
            application_count,
            is_interested: None,
            created_at: self.created,
            updated_at: self.updated,
            interested: Reactions::default(),
            applicants,
        }
    }
}

pub fn meetups() -> Vec<Meetup> {
    let applications = meetup_applications();
    [
        MeetupSeed {
            id: "m1",
            title: "聊聊用第一性原理做职业规划",
            topic: MeetupTopic::Career,
            description: "想找几位朋友线下交流一下，如何用第一性原理来重新思考职业发展路径。",
            thoughts: "最近一直在思考一个问题：传统的职业发展路径真的适合所有人吗？工作的本质是价值交换，技能是可以迁移和组合的，收入来源不一定是单一的。",
            host: profile(0, "10年产品经理，正在探索职业转型", &["思维模型", "职业发展", "自由职业"]),
            model: Some(("3", "第一性原理思维")),
            tags: &["职业规划", "第一性原理", "人生选择"],
            city: "北京",
            preferred_time: "周末下午 2-5 点",
            cost_split: CostSplit::Host,
            guests: (3, 1),
            status: MeetupStatus::Open,
            view_count: 234,
            interested_count: 12,
            created: at(2024, 2, 8, 10, 0),
            updated: at(2024, 2, 10, 15, 30),
        },
        MeetupSeed {
            id: "m2",
            title: "创业想法头脑风暴",
            topic: MeetupTopic::Startup,
            description: "有一个AI相关的创业想法，想约几位技术和产品背景的朋友聊聊可行性。",
            thoughts: "很多人在使用 AI 工具时，不知道如何写好 prompt。我的初步想法是做一个\"AI 助手的助手\"，帮用户优化和管理 prompt。",
            host: profile(1, "全栈工程师，连续创业者", &["AI", "创业", "产品设计"]),
            model: Some(("1", "SWOT 分析")),
            tags: &["创业", "AI", "产品验证", "MVP"],
            city: "上海",
            preferred_time: "工作日晚上 7-9 点",
            cost_split: CostSplit::Aa,
            guests: (4, 2),
            status: MeetupStatus::Open,
            view_count: 456,
            interested_count: 28,
            created: at(2024, 2, 5, 14, 0),
            updated: at(2024, 2, 11, 9, 0),
        },
        MeetupSeed {
            id: "m3",
            title: "深度聊聊投资认知",
            topic: MeetupTopic::Investment,
            description: "想和有投资经验的朋友交流一下投资思维框架和认知升级。",
            thoughts: "以前追涨杀跌，情绪化决策，没有自己的投资框架。现在的思考：投资本质是认知变现，需要建立自己的决策系统。",
            host: profile(2, "金融从业者，价值投资践行者", &["价值投资", "财务分析", "行业研究"]),
            model: None,
            tags: &["投资", "认知升级", "思维框架"],
            city: "深圳",
            preferred_time: "周六全天",
            cost_split: CostSplit::Host,
            guests: (2, 0),
            status: MeetupStatus::Open,
            view_count: 189,
            interested_count: 8,
            created: at(2024, 2, 9, 16, 0),
            updated: at(2024, 2, 9, 16, 0),
        },
        MeetupSeed {
            id: "m4",
            title: "技术人如何提升产品思维",
            topic: MeetupTopic::Technology,
            description: "作为技术出身，想和有产品经验的朋友聊聊如何培养产品思维。",
            thoughts: "作为一个写了8年代码的程序员，技术能力越来越强，但对产品的理解越来越机械。想知道产品思维是怎么训练出来的。",
            host: profile(3, "8年后端开发，想向产品方向拓展", &["技术架构", "产品设计", "用户体验"]),
            model: Some(("5", "用户思维")),
            tags: &["产品思维", "技术转型", "能力拓展"],
            city: "杭州",
            preferred_time: "周末均可",
            cost_split: CostSplit::Aa,
            guests: (3, 1),
            status: MeetupStatus::Open,
            view_count: 312,
            interested_count: 15,
            created: at(2024, 2, 7, 11, 0),
            updated: at(2024, 2, 10, 20, 0),
        },
        MeetupSeed {
            id: "m5",
            title: "35岁职业焦虑怎么破？",
            topic: MeetupTopic::Life,
            description: "想找同龄人聊聊35岁职业焦虑这个话题，分享彼此的应对策略。",
            thoughts: "最近\"35岁危机\"这个话题很火。我尝试的应对方法：建立被动收入，发展第二技能，保持学习习惯，调整心态预期。",
            host: profile(4, "34岁互联网人，正在寻找职业第二曲线", &["职业发展", "个人成长", "生活平衡"]),
            model: None,
            tags: &["35岁危机", "职业焦虑", "人生规划", "心态调整"],
            city: "广州",
            preferred_time: "周日下午",
            cost_split: CostSplit::Host,
            guests: (4, 3),
            status: MeetupStatus::Pending,
            view_count: 567,
            interested_count: 42,
            created: at(2024, 2, 3, 9, 0),
            updated: at(2024, 2, 11, 14, 0),
        },
    ]
    .into_iter()
    .map(|seed| seed.build(&applications))
    .collect()
}

pub fn meetup_applications() -> Vec<MeetupApplication> {
    [
        ("a1", "m1", 2, "我也在思考类似的问题，目前在尝试做自由职业，很想交流一下经验。", at(2024, 2, 9, 10, 0)),
        ("a2", "m2", 3, "做过几年产品，对 AI 领域也很感兴趣，希望能参与讨论。", at(2024, 2, 6, 18, 0)),
        ("a3", "m2", 4, "正在做 AI 工具类产品，有一些实战经验可以分享。", at(2024, 2, 7, 9, 0)),
    ]
    .into_iter()
    .map(|(id, meetup_id, applicant, message, created_at)| MeetupApplication {
        id: id.into(),
        meetup_id: meetup_id.into(),
        applicant: user(applicant),
        message: message.into(),
        status: ApplicationStatus::Accepted,
        created_at,
    })
    .collect()
}

pub fn experts() -> Vec<Expert> {
    use ConsultationField::*;
    let expert = |id: &str,
                  name: &str,
                  bio: &str,
                  title: &str,
                  company: &str,
                  experience: u32,
                  expertise: &[&str],
                  fields: Vec<ConsultationField>,
                  consult_count: u64,
                  rating: f64,
                  response_rate: f64,
                  hourly_rate: u64| Expert {
        user: UserInfo {
            bio: Some(bio.into()),
            ..UserInfo::new(id, name, avatar(&format!("expert{}", &id[1..])))
        },
        title: Some(title.into()),
        company: Some(company.into()),
        experience,
        expertise: tags(expertise),
        fields,
        consult_count,
        rating,
        response_rate,
        hourly_rate: Some(hourly_rate),
    };
    vec![
        expert("e1", "张明远", "15年互联网产品经验，前大厂产品总监", "资深产品专家", "前阿里巴巴", 15,
            &["产品设计", "用户增长", "商业化"], vec![Product, Management, Career], 128, 4.9, 0.95, 500),
        expert("e2", "李思涵", "连续创业者，3次成功退出经历", "创业导师", "某知名VC合伙人", 12,
            &["创业融资", "商业模式", "团队管理"], vec![Startup, Investment, Management], 86, 4.8, 0.88, 800),
        expert("e3", "王建国", "技术架构师，擅长大规模系统设计", "首席架构师", "某头部互联网公司", 18,
            &["系统架构", "技术选型", "团队建设"], vec![Technology, Management], 95, 4.95, 0.92, 600),
        expert("e4", "陈雨晴", "职业规划师，帮助500+人成功转型", "职业发展顾问", "独立咨询师", 10,
            &["职业规划", "面试辅导", "简历优化"], vec![Career, Psychology], 256, 4.85, 0.98, 300),
    ]
}

struct ConsultationSeed {
    id: &'static str,
    title: &'static str,
    field: ConsultationField,
    description: &'static str,
    background: &'static str,
    expectation: &'static str,
    requester: usize,
    model: Option<(&'static str, &'static str)>,
    tags: &'static [&'static str],
    reward: u64,
    mode: ConsultationMode,
    city: Option<&'static str>,
    deadline: DateTime<Utc>,
    status: ConsultationStatus,
    selected_expert: Option<usize>,
    view_count: u64,
    application_count: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl ConsultationSeed {
    fn build(self, experts: &[Expert], applications: &[ConsultationApplication]) -> Consultation {
        let mut applicants = Reactions::default();
        for a in applications.iter().filter(|a| a.consultation_id == self.id) {
            applicants.add(&a.expert.user.id);
        }
        Consultation {
            id: self.id.into(),
            title: self.title.into(),
            field: self.field,
            description: self.description.into(),
            background: self.background.into(),
            expectation: self.expectation.into(),
            requester: user(self.requester),
            model_id: self.model.map(|(id, _)| id.to_owned()),
            model_name: self.model.map(|(_, name)| name.to_owned()),
            tags: tags(self.tags),
            reward: self.reward,
            mode: self.mode,
            city: self.city.map(str::to_owned),
            deadline: self.deadline,
            status: self.status,
            view_count: self.view_count,
            application_count: self.application_count,
            selected_expert: self.selected_expert.and_then(|i| experts.get(i).cloned()),
            created_at: self.created,
            updated_at: self.updated,
            applicants,
        }
    }
}

pub fn consultations() -> Vec<Consultation> {
    use ConsultationField::*;
    let experts = experts();
    let applications = consultation_applications();
    [
        ConsultationSeed {
            id: "c1",
            title: "创业初期如何找到产品市场契合点（PMF）？",
            field: Startup,
            description: "我们是一个3人技术团队，有一个B端SaaS产品的想法，已经做了MVP，但不确定如何验证产品市场契合度。",
            background: "3个技术合伙人，目标市场是中小企业数据分析，已完成MVP，有10个种子用户，用户反馈不一。",
            expectation: "判断PMF的具体方法和指标，早期产品迭代的优先级建议。",
            requester: 1,
            model: Some(("1", "SWOT 分析")),
            tags: &["创业", "PMF", "SaaS", "B端"],
            reward: 500,
            mode: ConsultationMode::Online,
            city: None,
            deadline: at(2024, 2, 28, 23, 59),
            status: ConsultationStatus::Open,
            selected_expert: None,
            view_count: 456,
            application_count: 3,
            created: at(2024, 2, 10, 10, 0),
            updated: at(2024, 2, 12, 15, 30),
        },
        ConsultationSeed {
            id: "c2",
            title: "技术转管理，如何快速提升领导力？",
            field: Management,
            description: "最近被提拔为技术经理，管理一个8人团队，感觉自己还在用IC思维做事，希望得到管理方面的指导。",
            background: "工作8年，一直是技术骨干，上个月被提拔为技术经理，很多事情习惯自己上手，下属不太主动。",
            expectation: "从IC到Manager心态转变的方法，团队管理的基本框架和工具。",
            requester: 3,
            model: None,
            tags: &["管理", "技术转型", "领导力", "团队管理"],
            reward: 800,
            mode: ConsultationMode::Both,
            city: Some("北京"),
            deadline: at(2024, 2, 25, 23, 59),
            status: ConsultationStatus::Open,
            selected_expert: None,
            view_count: 678,
            application_count: 5,
            created: at(2024, 2, 8, 14, 0),
            updated: at(2024, 2, 11, 9, 0),
        },
        ConsultationSeed {
            id: "c3",
            title: "35岁程序员，转型产品还是技术深耕？",
            field: Career,
            description: "面临职业选择困惑，不知道是继续深耕技术还是转型产品经理，希望有经验的前辈指点。",
            background: "35岁，10年Java开发经验，对产品有兴趣，担心年龄大了技术竞争力下降。",
            expectation: "35岁转产品是否可行？如何评估自己更适合哪条路？",
            requester: 4,
            model: Some(("3", "第一性原理思维")),
            tags: &["职业规划", "35岁危机", "转型", "程序员"],
            reward: 300,
            mode: ConsultationMode::Online,
            city: None,
            deadline: at(2024, 3, 1, 23, 59),
            status: ConsultationStatus::Open,
            selected_expert: None,
            view_count: 1234,
            application_count: 8,
            created: at(2024, 2, 5, 9, 0),
            updated: at(2024, 2, 10, 20, 0),
        },
        ConsultationSeed {
            id: "c4",
            title: "如何设计一个高并发的订单系统？",
            field: Technology,
            description: "正在主导公司新订单系统的架构设计，日订单量预计百万级，希望得到架构方面的专业指导。",
            background: "电商公司，现有订单系统是单体架构，需要重构为分布式架构，关注数据一致性与库存扣减。",
            expectation: "百万级订单系统的整体架构方案，关键技术点的选型建议。",
            requester: 2,
            model: None,
            tags: &["架构设计", "高并发", "分布式", "电商"],
            reward: 1000,
            mode: ConsultationMode::Online,
            city: None,
            deadline: at(2024, 2, 20, 23, 59),
            status: ConsultationStatus::Matched,
            selected_expert: Some(2),
            view_count: 892,
            application_count: 6,
            created: at(2024, 2, 3, 16, 0),
            updated: at(2024, 2, 9, 14, 0),
        },
        ConsultationSeed {
            id: "c5",
            title: "天使轮融资BP和路演准备指导",
            field: Investment,
            description: "准备进行天使轮融资，需要专业指导如何准备BP和路演。",
            background: "AI+教育赛道，产品已上线，月活2万，目标金额500万。",
            expectation: "BP的框架和重点，路演技巧和常见问题，估值逻辑。",
            requester: 0,
            model: None,
            tags: &["融资", "BP", "路演", "天使轮", "AI教育"],
            reward: 1500,
            mode: ConsultationMode::Offline,
            city: Some("上海"),
            deadline: at(2024, 2, 22, 23, 59),
            status: ConsultationStatus::Open,
            selected_expert: None,
            view_count: 567,
            application_count: 4,
            created: at(2024, 2, 7, 11, 0),
            updated: at(2024, 2, 11, 16, 0),
        },
    ]
    .into_iter()
    .map(|seed| seed.build(&experts, &applications))
    .collect()
}

pub fn consultation_applications() -> Vec<ConsultationApplication> {
    let experts = experts();
    [
        ("ca1", "c1", 1, "我有3次创业经历，其中2次成功找到PMF并完成融资。可以从实战角度分享PMF验证的方法论。", "2小时线上沟通", at(2024, 2, 11, 10, 0)),
        ("ca2", "c2", 0, "我从技术骨干到产品总监，管理过100+人的团队。可以分享从IC到Manager的转变心得。", "1.5小时线上 + 可选线下", at(2024, 2, 9, 15, 0)),
    ]
    .into_iter()
    .filter_map(|(id, consultation_id, expert, proposal, estimated_time, created_at)| {
        Some(ConsultationApplication {
            id: id.into(),
            consultation_id: consultation_id.into(),
            expert: experts.get(expert)?.clone(),
            proposal: proposal.into(),
            estimated_time: estimated_time.into(),
            quotation: None,
            status: ApplicationStatus::Pending,
            created_at,
        })
    })
    .collect()
}

pub fn categories() -> Vec<Category> {
    let created = at(2024, 1, 1, 0, 0);
    [
        ("cat1", "战略分析", "分析环境与定位的框架", "chart", 1),
        ("cat2", "决策思维", "在不确定中做出选择", "scale", 2),
        ("cat3", "创新思维", "打破惯性、发现新解", "bulb", 3),
        ("cat4", "沟通协作", "让团队高效对话", "team", 4),
    ]
    .into_iter()
    .map(|(id, name, description, icon, sort)| Category {
        id: id.into(),
        name: name.into(),
        parent_id: None,
        level: 1,
        path: Category::root_path(id),
        description: Some(description.into()),
        icon: Some(icon.into()),
        sort,
        status: CategoryStatus::Enabled,
        model_count: 0,
        created_at: created,
        updated_at: created,
    })
    .collect()
}

pub fn models() -> Vec<ThinkingModel> {
    let categories = categories();
    let seeds = [
        ("1", "SWOT 分析模型", "从优势、劣势、机会、威胁四个维度评估处境", "cat1", 1, true, None, &["战略", "分析"][..], (320, 120, 45, 18, 210), at(2024, 1, 20, 9, 0)),
        ("2", "决策矩阵", "为多个选项按加权标准打分，量化比较", "cat2", 2, true, None, &["决策", "效率"][..], (180, 60, 12, 9, 95), at(2024, 1, 25, 9, 0)),
        ("3", "第一性原理思维", "回到最基本的事实，从头推导结论", "cat3", 0, false, Some(99), &["思维", "创新"][..], (450, 200, 88, 40, 380), at(2024, 2, 1, 9, 0)),
        ("4", "5W2H 分析法", "用七个问题把模糊的计划拆成可执行的细节", "cat1", 2, true, None, &["分析", "规划"][..], (150, 70, 10, 5, 60), at(2024, 1, 28, 9, 0)),
        ("5", "用户思维", "站在用户的处境理解需求与动机", "cat3", 3, true, None, &["创新", "沟通"][..], (210, 90, 30, 11, 150), at(2024, 2, 3, 9, 0)),
        ("6", "六顶思考帽", "用六种角色轮换视角，让讨论有序展开", "cat4", 3, false, Some(49), &["沟通", "管理"][..], (260, 110, 52, 14, 230), at(2024, 2, 5, 9, 0)),
    ];
    let codes = [
        "swot-analysis",
        "decision-matrix",
        "first-principles",
        "5w2h",
        "user-thinking",
        "six-thinking-hats",
    ];
    seeds
        .into_iter()
        .zip(codes)
        .map(
            |((id, title, description, category_id, author, is_free, price, model_tags, stats, updated_at), code)| {
                let (adoptions, practices, discussions, forks, likes) = stats;
                let category = categories.iter().find(|c| c.id == category_id);
                ThinkingModel {
                    id: id.into(),
                    code: code.into(),
                    title: title.into(),
                    description: description.into(),
                    cover: format!("https://images.unsplash.com/photo-model-{id}?w=800&h=400&fit=crop"),
                    author: user(author),
                    is_free,
                    price,
                    category: category.map(|c| c.name.clone()).unwrap_or_default(),
                    category_id: Some(category_id.into()),
                    tags: tags(model_tags),
                    stats: ModelStats {
                        adoptions,
                        practices,
                        discussions,
                        forks,
                        likes,
                    },
                    content: Some(format!("# {title}\n\n{description}")),
                    status: ModelStatus::Published,
                    publish_time: Some(at(2024, 1, 15, 9, 0)),
                    forked_from: None,
                    is_liked: None,
                    is_adopted: None,
                    created_at: at(2024, 1, 15, 9, 0),
                    updated_at,
                    likes: Reactions::default(),
                    adopters: Reactions::default(),
                    purchasers: Reactions::default(),
                }
            },
        )
        .collect()
}

pub fn topics(now: DateTime<Utc>) -> Vec<Topic> {
    let topic = |id: &str,
                 title: &str,
                 description: &str,
                 status: TopicStatus,
                 model: Option<(&str, &str)>,
                 priority: u8,
                 topic_tags: &[&str],
                 days_ago: i64| {
        let created_at = now - Duration::days(days_ago);
        Topic {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            background: String::new(),
            goal: String::new(),
            constraints: String::new(),
            status,
            owner_id: DEMO_OWNER_ID.into(),
            model_id: model.map(|(id, _)| id.to_owned()),
            model_name: model.map(|(_, name)| name.to_owned()),
            priority,
            tags: tags(topic_tags),
            analysis_count: 0,
            action_count: 0,
            deadline: None,
            completed_at: (status == TopicStatus::Completed).then_some(created_at + Duration::days(3)),
            created_at,
            updated_at: created_at,
            lineage: AnalysisLineage::default(),
        }
    };
    let actions = actions(now);
    let analyses = analyses(now);
    let action_count = |id: &str| {
        actions
            .iter()
            .filter(|a| a.topic_id.as_deref() == Some(id))
            .count() as u64
    };
    vec![
        topic("t1", "是否接受新公司的 offer", "薪资更高但稳定性存疑，需要系统权衡", TopicStatus::InProgress, Some(("2", "决策矩阵")), 1, &["决策", "职业发展"], 2),
        topic("t2", "团队季度目标规划", "拆解季度目标并对齐优先级", TopicStatus::InProgress, Some(("4", "5W2H 分析法")), 2, &["规划", "管理"], 5),
        topic("t3", "个人副业方向评估", "评估三个副业方向的可行性", TopicStatus::Completed, Some(("1", "SWOT 分析模型")), 2, &["战略", "分析"], 20),
        topic("t4", "读书会选题", "下一期读书会读什么", TopicStatus::Draft, None, 3, &["沟通"], 1),
    ]
    .into_iter()
    .map(|t| {
        let mine: Vec<&Analysis> = analyses.iter().filter(|a| a.topic_id == t.id).collect();
        Topic {
            action_count: action_count(&t.id),
            analysis_count: mine.len() as u64,
            lineage: AnalysisLineage::from_rows(mine),
            ..t
        }
    })
    .collect()
}

/// Two SWOT versions on t1 and one 5W2H pass on t2.
pub fn analyses(now: DateTime<Utc>) -> Vec<Analysis> {
    let analysis = |id: &str, topic_id: &str, model: (&str, &str), version: u32, content: &str, days_ago: i64| {
        let created_at = now - Duration::days(days_ago);
        Analysis {
            id: id.into(),
            topic_id: topic_id.into(),
            model_id: model.0.into(),
            model_name: model.1.into(),
            content: content.into(),
            ai_analysis: None,
            ai_suggestions: None,
            version,
            is_current: false,
            user_id: DEMO_OWNER_ID.into(),
            created_at,
            updated_at: created_at,
        }
    };
    vec![
        analysis("an2", "t1", ("2", "决策矩阵"), 2, r#"{"options":["接受","拒绝"],"weights":{"薪资":0.4,"稳定性":0.6}}"#, 1),
        analysis("an1", "t1", ("2", "决策矩阵"), 1, r#"{"options":["接受","拒绝"]}"#, 2),
        analysis("an3", "t2", ("4", "5W2H 分析法"), 1, r#"{"what":"季度目标","why":"对齐优先级"}"#, 4),
    ]
}

pub fn actions(now: DateTime<Utc>) -> Vec<Action> {
    let action = |id: &str,
                  title: &str,
                  topic: Option<(&str, &str)>,
                  status: ActionStatus,
                  priority: ActionPriority,
                  completion_rate: u8,
                  due_in_days: Option<i64>,
                  days_ago: i64| {
        let created_at = now - Duration::days(days_ago);
        Action {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            owner_id: DEMO_OWNER_ID.into(),
            topic_id: topic.map(|(id, _)| id.to_owned()),
            topic_title: topic.map(|(_, title)| title.to_owned()),
            analysis_id: None,
            guiding_principle: None,
            completion_rate,
            status,
            priority,
            follow_up_count: 0,
            due_date: due_in_days.map(|d| now + Duration::days(d)),
            completed_at: (status == ActionStatus::Completed).then_some(now - Duration::days(1)),
            is_overdue: false,
            created_at,
            updated_at: created_at,
            progress_before: 0,
        }
    };
    let offer = Some(("t1", "是否接受新公司的 offer"));
    let quarter = Some(("t2", "团队季度目标规划"));
    vec![
        action("act1", "列出两家公司的关键差异", offer, ActionStatus::InProgress, ActionPriority::High, 60, Some(2), 2),
        action("act2", "向行业朋友了解新公司口碑", offer, ActionStatus::Pending, ActionPriority::Medium, 0, Some(-1), 2),
        action("act3", "整理上季度复盘结论", quarter, ActionStatus::Completed, ActionPriority::Medium, 100, Some(-3), 5),
        action("act4", "与每位成员一对一对齐目标", quarter, ActionStatus::Pending, ActionPriority::Low, 0, None, 4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_methodology_discussion() {
        let hits: Vec<_> = discussions()
            .into_iter()
            .filter(|d| d.category == DiscussionCategory::Methodology)
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "如何用第一性原理思考职业发展？");
    }

    #[test]
    fn meetup_application_counts_follow_applications() {
        let meetups = meetups();
        let count = |id: &str| {
            meetups
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.application_count)
        };
        assert_eq!(count("m1"), Some(1));
        assert_eq!(count("m2"), Some(2));
        assert_eq!(count("m3"), Some(0));
    }

    #[test]
    fn reply_counts_match_nested_replies() {
        for c in comments() {
            assert_eq!(c.reply_count, c.replies.len() as u64);
            assert!(c.replies.iter().all(|r| r.parent_id.as_deref() == Some(c.id.as_str())));
        }
    }

    #[test]
    fn matched_consultation_has_its_expert() {
        let c4 = consultations().into_iter().find(|c| c.id == "c4").unwrap();
        assert_eq!(c4.selected_expert.map(|e| e.user.id), Some("e3".to_owned()));
    }

    #[test]
    fn topic_action_counts_follow_actions() {
        let counts: Vec<u64> = topics(Utc::now()).iter().map(|t| t.action_count).collect();
        assert_eq!(counts, [2, 2, 0, 0]);
    }

    #[test]
    fn topic_lineage_follows_analyses() {
        let topics = topics(Utc::now());
        let counts: Vec<u64> = topics.iter().map(|t| t.analysis_count).collect();
        assert_eq!(counts, [2, 1, 0, 0]);
        assert_eq!(topics[0].lineage.current("2"), Some("an2"));
        assert_eq!(topics[0].lineage.last_version("2"), 2);
    }

    #[test]
    fn model_codes_are_unique() {
        let mut codes: Vec<String> = models().into_iter().map(|m| m.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }

    #[test]
    fn every_model_points_at_a_known_category() {
        let categories = categories();
        for m in models() {
            assert!(categories.iter().any(|c| Some(&c.id) == m.category_id.as_ref()));
            assert!(!m.category.is_empty());
        }
    }
}
